//! Inbound API of the ledger.

use shared_types::{AssignmentCode, Weight};

use crate::error::LedgerResult;

/// Company weight aggregates as seen by the disposal core.
///
/// Safe under a single writer only. Concurrent writers in other processes
/// would lose updates.
pub trait WeightLedgerApi: Send + Sync {
    /// Current accumulated weight.
    fn get(&self, code: AssignmentCode) -> LedgerResult<Weight>;

    /// Read-modify-write: `max(0, current + delta)`. Returns the new total.
    fn apply_delta(&self, code: AssignmentCode, company: &str, delta: Weight)
        -> LedgerResult<Weight>;

    /// Every assignment code registered for `company`, ascending.
    fn company_codes(&self, company: &str) -> LedgerResult<Vec<AssignmentCode>>;
}
