//! # JSON Snapshot Store
//!
//! Users and aggregates kept in one human-editable JSON file:
//!
//! ```json
//! {
//!   "users": [
//!     { "uid": "DF 79 1A 82", "name": "Kim", "company": "Acme",
//!       "assignment_code": 8414, "department": "Plant 2" }
//!   ],
//!   "aggregates": [
//!     { "assignment_code": 8414, "company": "Acme", "accumulated_weight": 40.0 }
//!   ]
//! }
//! ```
//!
//! The file is read once at open. Every write goes to a temp file in the
//! same directory, is synced, then renamed over the ledger, so a power cut
//! leaves either the old or the new snapshot on disk.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{AssignmentCode, Uid, User, WeightAggregate};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::ports::{AggregateStore, UserDirectory};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    aggregates: Vec<WeightAggregate>,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uid, User>,
    aggregates: BTreeMap<AssignmentCode, WeightAggregate>,
}

impl Tables {
    fn to_snapshot(&self) -> Snapshot {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| a.uid.cmp(&b.uid));
        Snapshot {
            users,
            aggregates: self.aggregates.values().cloned().collect(),
        }
    }
}

impl From<Snapshot> for Tables {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            users: snapshot
                .users
                .into_iter()
                .map(|u| (u.uid.clone(), u))
                .collect(),
            aggregates: snapshot
                .aggregates
                .into_iter()
                .map(|a| (a.assignment_code, a))
                .collect(),
        }
    }
}

/// File-backed [`UserDirectory`] and [`AggregateStore`].
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl JsonFileStore {
    /// Load the snapshot at `path`. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let path = path.into();
        let tables = match fs::read(&path) {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes)
                    .map_err(|e| LedgerError::storage(format!("{}: {e}", path.display())))?;
                Tables::from(snapshot)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "Ledger file not found, starting empty");
                Tables::default()
            }
            Err(e) => return Err(LedgerError::storage(format!("{}: {e}", path.display()))),
        };

        info!(
            path = %path.display(),
            users = tables.users.len(),
            aggregates = tables.aggregates.len(),
            "Ledger file loaded"
        );
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register or replace a user.
    pub fn upsert_user(&self, user: User) -> LedgerResult<()> {
        let mut tables = self.tables.write();
        let uid = user.uid.clone();
        let previous = tables.users.insert(uid.clone(), user);

        if let Err(e) = self.persist(&tables) {
            match previous {
                Some(user) => tables.users.insert(uid, user),
                None => tables.users.remove(&uid),
            };
            return Err(e);
        }
        Ok(())
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn persist(&self, tables: &Tables) -> LedgerResult<()> {
        let bytes = serde_json::to_vec_pretty(&tables.to_snapshot())
            .map_err(LedgerError::storage)?;
        let dir = self.directory();
        let io_err =
            |e: std::io::Error| LedgerError::storage(format!("{}: {e}", self.path.display()));

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        // Flush the directory entry for the rename.
        if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
            warn!(dir = %dir.display(), error = %e, "Ledger directory sync failed");
        }
        debug!(path = %self.path.display(), "Ledger file written");
        Ok(())
    }
}

impl UserDirectory for JsonFileStore {
    fn find_user(&self, uid: &Uid) -> LedgerResult<Option<User>> {
        Ok(self.tables.read().users.get(uid).cloned())
    }
}

impl AggregateStore for JsonFileStore {
    fn load(&self, code: AssignmentCode) -> LedgerResult<Option<WeightAggregate>> {
        Ok(self.tables.read().aggregates.get(&code).cloned())
    }

    fn store(&self, aggregate: &WeightAggregate) -> LedgerResult<()> {
        let mut tables = self.tables.write();
        let previous = tables
            .aggregates
            .insert(aggregate.assignment_code, aggregate.clone());

        if let Err(e) = self.persist(&tables) {
            // Keep memory and disk in step.
            match previous {
                Some(row) => tables.aggregates.insert(row.assignment_code, row),
                None => tables.aggregates.remove(&aggregate.assignment_code),
            };
            return Err(e);
        }
        Ok(())
    }

    fn find_by_company(&self, company: &str) -> LedgerResult<Vec<WeightAggregate>> {
        Ok(self
            .tables
            .read()
            .aggregates
            .values()
            .filter(|a| a.company == company)
            .cloned()
            .collect())
    }
}
