//! Results of the state machine's operations, as returned to the terminal.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_types::{AssignmentCode, LockState, Uid, Weight};

use super::phase::PhaseName;
use super::session::SessionId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthOutcome {
    pub session_started: bool,
    pub session_id: SessionId,
    pub uid: Uid,
    pub name: String,
    pub company: String,
    pub baseline_weight: Weight,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmOutcome {
    pub confirmed: bool,
    pub uid: Uid,
}

/// Result of a finalized disposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub uid: Uid,
    pub name: String,
    pub company: String,
    pub assignment_code: AssignmentCode,
    /// `post − baseline`; negative when weight was removed.
    pub delta: Weight,
    pub company_total: Weight,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetOutcome {
    /// Whether a session was cleared.
    pub cleared: bool,
    pub lock: LockState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub uid: Uid,
    pub baseline_weight: Weight,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub confirmed: bool,
    pub expired: bool,
}

/// Read-only snapshot of the kiosk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KioskStatus {
    pub phase: PhaseName,
    pub lock: LockState,
    pub session: Option<SessionView>,
}
