//! # Disposal Events
//!
//! Wire payload published after every finalized disposal.
//!
//! ```json
//! [ { "asgn_cd": "8414", "company": "Acme", "weight": -2.7 } ]
//! ```

use serde::{Deserialize, Serialize};
use shared_types::{AssignmentCode, Weight};

use crate::error::{PublishError, PublishResult};

/// One company's share of a disposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    /// Assignment code, zero-padded to four digits.
    pub asgn_cd: String,
    pub company: String,
    /// Delta in kilograms. May be negative.
    pub weight: Weight,
}

/// A disposal broadcast. Serialises as a bare JSON array of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisposalEvent {
    pub records: Vec<WeightRecord>,
}

impl DisposalEvent {
    /// Event attributing `delta` to a single company.
    #[must_use]
    pub fn single(assignment_code: AssignmentCode, company: impl Into<String>, delta: Weight) -> Self {
        Self {
            records: vec![WeightRecord {
                asgn_cd: assignment_code.padded(),
                company: company.into(),
                weight: delta,
            }],
        }
    }

    /// One record per assignment code registered for `company`, each
    /// carrying the same delta.
    #[must_use]
    pub fn for_codes(codes: &[AssignmentCode], company: &str, delta: Weight) -> Self {
        Self {
            records: codes
                .iter()
                .map(|code| WeightRecord {
                    asgn_cd: code.padded(),
                    company: company.to_string(),
                    weight: delta,
                })
                .collect(),
        }
    }

    /// JSON bytes as they go on the wire.
    pub fn to_payload(&self) -> PublishResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| PublishError::Encode(e.to_string()))
    }
}
