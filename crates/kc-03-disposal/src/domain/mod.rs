//! Domain layer for the disposal subsystem

pub mod config;
pub mod outcome;
pub mod phase;
pub mod session;

pub use config::{SessionConfig, MAX_SESSION_MINUTES};
pub use outcome::{AuthOutcome, ConfirmOutcome, KioskStatus, Receipt, ResetOutcome, SessionView};
pub use phase::{DisposalPhase, PhaseName};
pub use session::{Session, SessionId, SessionStore};
