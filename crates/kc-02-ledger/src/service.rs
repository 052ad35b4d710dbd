//! # Weight Ledger Service
//!
//! Compare-and-update over an [`AggregateStore`]. The whole read, add,
//! clamp, write cycle for one call runs under a single in-process lock, so
//! two finalizations on this kiosk cannot interleave and lose a delta.

use parking_lot::Mutex;
use shared_types::{AssignmentCode, Weight, WeightAggregate};
use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::ports::{AggregateStore, WeightLedgerApi};

/// Ledger of per-company accumulated disposal weight.
pub struct WeightLedger<S> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: AggregateStore> WeightLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load_existing(&self, code: AssignmentCode) -> LedgerResult<WeightAggregate> {
        self.store
            .load(code)?
            .ok_or(LedgerError::CompanyNotFound { code })
    }
}

impl<S: AggregateStore> WeightLedgerApi for WeightLedger<S> {
    fn get(&self, code: AssignmentCode) -> LedgerResult<Weight> {
        Ok(self.load_existing(code)?.accumulated_weight)
    }

    fn apply_delta(
        &self,
        code: AssignmentCode,
        company: &str,
        delta: Weight,
    ) -> LedgerResult<Weight> {
        let _guard = self.write_lock.lock();

        let mut aggregate = self.load_existing(code)?;
        if aggregate.company != company {
            warn!(
                code = %code,
                row_company = %aggregate.company,
                user_company = %company,
                "Company name differs from aggregate row"
            );
        }

        let previous = aggregate.accumulated_weight;
        aggregate.accumulated_weight = (previous + delta).clamp_non_negative();
        self.store.store(&aggregate)?;

        info!(
            code = %code,
            company = %aggregate.company,
            previous = %previous,
            delta = %delta,
            total = %aggregate.accumulated_weight,
            "Ledger updated"
        );
        Ok(aggregate.accumulated_weight)
    }

    fn company_codes(&self, company: &str) -> LedgerResult<Vec<AssignmentCode>> {
        let mut codes: Vec<_> = self
            .store
            .find_by_company(company)?
            .into_iter()
            .map(|a| a.assignment_code)
            .collect();
        codes.sort_unstable();
        Ok(codes)
    }
}
