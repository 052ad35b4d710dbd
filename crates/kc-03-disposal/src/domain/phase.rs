//! # Disposal Phases
//!
//! ```text
//!          authenticate                 finalize
//! [Idle] ──────────────→ [Authenticating] ──→ [Disposing] ──────→ [Finalizing] ──→ [Idle]
//!    ↑          │                                  │ reaper / expiry      │
//!    └──────────┴──── error: lock, clear ──────────┴──────────────────────┘
//! ```
//!
//! `Authenticating` carries the attempt id so a request that outlives a
//! reset can recognise that the kiosk moved on without it.

use serde::Serialize;
use uuid::Uuid;

use super::session::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalPhase {
    #[default]
    Idle,
    Authenticating {
        attempt: Uuid,
    },
    Disposing {
        session: SessionId,
        confirmed: bool,
    },
    Finalizing {
        session: SessionId,
    },
}

impl DisposalPhase {
    pub fn name(&self) -> PhaseName {
        match self {
            Self::Idle => PhaseName::Idle,
            Self::Authenticating { .. } => PhaseName::Authenticating,
            Self::Disposing { .. } => PhaseName::Disposing,
            Self::Finalizing { .. } => PhaseName::Finalizing,
        }
    }

    /// The session this phase works on, if any.
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::Disposing { session, .. } | Self::Finalizing { session } => Some(*session),
            Self::Idle | Self::Authenticating { .. } => None,
        }
    }
}

/// Phase without its payload, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Idle,
    Authenticating,
    Disposing,
    Finalizing,
}
