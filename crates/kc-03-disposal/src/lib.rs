//! # kc-03-disposal
//!
//! The kiosk core: one authenticated user at a time, the barrier unlocked
//! only while that user's session is live.
//!
//! ## Overview
//!
//! - **DisposalStateMachine**: `authenticate → confirm → finalize`, plus
//!   `reset`, driven by requests from the terminal
//! - **SessionReaper**: periodic removal of abandoned sessions
//! - **KioskContext**: the shared critical section both of them go through
//!
//! ## Architecture
//!
//! ```text
//!              ┌────────────────── kc-03-disposal ──────────────────┐
//! Gateway ───→ │ DisposalApi ─→ DisposalStateMachine ─┐             │
//!              │                                      ├→ KioskContext├──→ TagSource / WeightSource / Actuator
//! Timer ─────→ │ SessionReaper ───────────────────────┘             ├──→ UserDirectory / WeightLedgerApi
//!              │                                                    ├──→ EventPublisher
//!              └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Safety Invariant
//!
//! Whenever the interlock mutex is free, the lock output is `Locked`
//! unless a live session exists or that session is mid-finalization.

pub mod context;
pub mod domain;
pub mod error;
pub mod ports;
pub mod reaper;
pub mod service;
pub mod testing;

pub use context::{Interlock, KioskContext, KioskPorts};
pub use domain::{
    AuthOutcome, ConfirmOutcome, DisposalPhase, KioskStatus, PhaseName, Receipt, ResetOutcome,
    Session, SessionConfig, SessionId, SessionStore, SessionView, MAX_SESSION_MINUTES,
};
pub use error::{DisposalError, DisposalResult};
pub use ports::DisposalApi;
pub use reaper::{ReapCandidate, ReapOutcome, SessionReaper};
pub use service::DisposalStateMachine;
