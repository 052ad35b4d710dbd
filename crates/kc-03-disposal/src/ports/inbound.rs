//! Inbound API of the disposal subsystem, called by the request surface.

use async_trait::async_trait;
use shared_types::Uid;

use crate::domain::{AuthOutcome, ConfirmOutcome, KioskStatus, Receipt, ResetOutcome};
use crate::error::DisposalResult;

#[async_trait]
pub trait DisposalApi: Send + Sync {
    /// Wait for a tag on the reader.
    async fn read_tag(&self) -> DisposalResult<Uid>;

    /// Look up the user, capture the baseline, open a session and unlock.
    async fn authenticate(&self, tag_uid: Uid) -> DisposalResult<AuthOutcome>;

    /// Check a re-presented tag against the active session.
    async fn confirm(&self, tag_uid: Uid) -> DisposalResult<ConfirmOutcome>;

    /// Re-weigh, book the delta, publish it, lock and end the session.
    async fn finalize(&self) -> DisposalResult<Receipt>;

    /// Return to the safe state unconditionally.
    async fn reset(&self) -> ResetOutcome;

    fn status(&self) -> KioskStatus;
}
