//! # kc-02-ledger
//!
//! Who may dispose, and how much each company has disposed so far.
//!
//! ## Overview
//!
//! - **UserDirectory**: `uid → User` lookup, read-only to the kiosk
//! - **WeightLedger**: per-assignment-code running total, updated by
//!   compare-and-update and clamped at zero
//!
//! Aggregate rows are created by registration, never here. Applying a
//! delta to an unknown assignment code fails with `CompanyNotFound`.
//!
//! ```text
//! DisposalMachine ──apply_delta──→ WeightLedger ──load/store──→ AggregateStore
//!                 ──find_user────────────────────────────────→ UserDirectory
//! ```

pub mod adapters;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryAggregateStore, InMemoryUserDirectory, JsonFileStore};
pub use error::{LedgerError, LedgerResult};
pub use ports::{AggregateStore, UserDirectory, WeightLedgerApi};
pub use service::WeightLedger;
