//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `Uid`, `User`
//! - **Ledger**: `AssignmentCode`, `WeightAggregate`
//! - **Hardware**: `LockState`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::weight::Weight;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Identifier read from a proximity credential.
///
/// Normalised to upper-case hex pairs separated by single spaces
/// (`"DF 79 1A 82"`), so a UID typed by an operator compares equal to the
/// same UID read from hardware.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    /// Normalise and validate a textual UID.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let normalized = raw
            .split_whitespace()
            .map(str::to_ascii_uppercase)
            .collect::<Vec<_>>()
            .join(" ");
        if normalized.is_empty() {
            return Err(ParseError::EmptyUid);
        }
        Ok(Self(normalized))
    }

    /// Render raw UID bytes the way card readers print them.
    ///
    /// Returns `None` for an empty byte string.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        let rendered = bytes
            .iter()
            .map(|b| hex::encode_upper([*b]))
            .collect::<Vec<_>>()
            .join(" ");
        Some(Self(rendered))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Uid {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Uid {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

/// A registered kiosk user. Read-only to the kiosk core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Credential UID.
    pub uid: Uid,
    /// Display name shown on the terminal.
    pub name: String,
    /// Company the user disposes on behalf of.
    pub company: String,
    /// Key of the company's weight aggregate.
    pub assignment_code: AssignmentCode,
    /// Department within the company.
    #[serde(default = "default_department")]
    pub department: String,
}

fn default_department() -> String {
    "Unknown".to_string()
}

// =============================================================================
// CLUSTER B: LEDGER
// =============================================================================

/// Stable key identifying a company's weight aggregate row.
///
/// Always rendered as at least four zero-padded digits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentCode(pub u32);

impl AssignmentCode {
    /// Wire form: zero-padded to four digits (`0` → `"0000"`).
    #[must_use]
    pub fn padded(self) -> String {
        format!("{:04}", self.0)
    }
}

impl fmt::Display for AssignmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for AssignmentCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ParseError::InvalidAssignmentCode(s.to_string()))
    }
}

/// Accumulated disposal weight for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightAggregate {
    pub assignment_code: AssignmentCode,
    pub company: String,
    /// Never negative; the ledger clamps at zero.
    pub accumulated_weight: Weight,
}

// =============================================================================
// CLUSTER C: HARDWARE
// =============================================================================

/// Commanded state of the barrier lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    Locked,
    Unlocked,
}

impl LockState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LockState::Locked => "locked",
            LockState::Unlocked => "unlocked",
        }
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_normalization() {
        let typed = Uid::parse("  df 79  1a 82 ").unwrap();
        let read = Uid::from_bytes(&[0xDF, 0x79, 0x1A, 0x82]).unwrap();
        assert_eq!(typed, read);
        assert_eq!(read.as_str(), "DF 79 1A 82");
    }

    #[test]
    fn test_uid_rejects_blank() {
        assert_eq!(Uid::parse("   "), Err(ParseError::EmptyUid));
        assert!(Uid::from_bytes(&[]).is_none());
    }

    #[test]
    fn test_assignment_code_padding() {
        assert_eq!(AssignmentCode(0).padded(), "0000");
        assert_eq!(AssignmentCode(42).padded(), "0042");
        assert_eq!(AssignmentCode(8414).to_string(), "8414");
    }

    #[test]
    fn test_user_deserializes_with_default_department() {
        let user: User = serde_json::from_str(
            r#"{"uid":"04 e3 43 6a","name":"Kim","company":"Acme","assignment_code":8414}"#,
        )
        .unwrap();
        assert_eq!(user.uid.as_str(), "04 E3 43 6A");
        assert_eq!(user.department, "Unknown");
        assert_eq!(user.assignment_code, AssignmentCode(8414));
    }

    #[test]
    fn test_lock_state_serde() {
        assert_eq!(serde_json::to_string(&LockState::Unlocked).unwrap(), "\"unlocked\"");
    }
}
