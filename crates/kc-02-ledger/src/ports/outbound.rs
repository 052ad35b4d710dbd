//! Storage the ledger depends on.
//!
//! Production: `JsonFileStore`
//! Testing: `InMemoryUserDirectory`, `InMemoryAggregateStore`

use std::sync::Arc;

use shared_types::{AssignmentCode, Uid, User, WeightAggregate};

use crate::error::LedgerResult;

/// Read-only lookup of registered users.
pub trait UserDirectory: Send + Sync {
    fn find_user(&self, uid: &Uid) -> LedgerResult<Option<User>>;
}

/// Row storage for company aggregates.
pub trait AggregateStore: Send + Sync {
    fn load(&self, code: AssignmentCode) -> LedgerResult<Option<WeightAggregate>>;

    /// Insert or replace the row keyed by `aggregate.assignment_code`.
    fn store(&self, aggregate: &WeightAggregate) -> LedgerResult<()>;

    fn find_by_company(&self, company: &str) -> LedgerResult<Vec<WeightAggregate>>;
}

impl<T: UserDirectory + ?Sized> UserDirectory for Arc<T> {
    fn find_user(&self, uid: &Uid) -> LedgerResult<Option<User>> {
        (**self).find_user(uid)
    }
}

impl<T: AggregateStore + ?Sized> AggregateStore for Arc<T> {
    fn load(&self, code: AssignmentCode) -> LedgerResult<Option<WeightAggregate>> {
        (**self).load(code)
    }

    fn store(&self, aggregate: &WeightAggregate) -> LedgerResult<()> {
        (**self).store(aggregate)
    }

    fn find_by_company(&self, company: &str) -> LedgerResult<Vec<WeightAggregate>> {
        (**self).find_by_company(company)
    }
}
