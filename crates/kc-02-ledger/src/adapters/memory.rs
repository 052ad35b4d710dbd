//! In-memory stores for tests and the simulated kiosk.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use shared_types::{AssignmentCode, Uid, User, WeightAggregate};

use crate::error::{LedgerError, LedgerResult};
use crate::ports::{AggregateStore, UserDirectory};

/// Users keyed by UID.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uid, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let directory = Self::new();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    pub fn insert(&self, user: User) {
        self.users.write().insert(user.uid.clone(), user);
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_user(&self, uid: &Uid) -> LedgerResult<Option<User>> {
        Ok(self.users.read().get(uid).cloned())
    }
}

/// Aggregate rows keyed by assignment code.
///
/// `fail_writes` makes every `store` fail, for exercising error paths.
#[derive(Debug, Default)]
pub struct InMemoryAggregateStore {
    rows: RwLock<BTreeMap<AssignmentCode, WeightAggregate>>,
    fail_writes: AtomicBool,
}

impl InMemoryAggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, aggregate: WeightAggregate) {
        self.rows
            .write()
            .insert(aggregate.assignment_code, aggregate);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl AggregateStore for InMemoryAggregateStore {
    fn load(&self, code: AssignmentCode) -> LedgerResult<Option<WeightAggregate>> {
        Ok(self.rows.read().get(&code).cloned())
    }

    fn store(&self, aggregate: &WeightAggregate) -> LedgerResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::storage("write rejected"));
        }
        self.insert(aggregate.clone());
        Ok(())
    }

    fn find_by_company(&self, company: &str) -> LedgerResult<Vec<WeightAggregate>> {
        Ok(self
            .rows
            .read()
            .values()
            .filter(|a| a.company == company)
            .cloned()
            .collect())
    }
}
