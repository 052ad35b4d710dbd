//! # Kiosk Context
//!
//! The process-wide object both control paths share. Built once at startup,
//! handed to the state machine and the reaper as `Arc<KioskContext>`, and
//! put into the safe state one last time on shutdown.
//!
//! ```text
//!   request handlers ──→ DisposalStateMachine ──┐
//!                                               ├──→ Mutex<Interlock> { sessions, lock, phase }
//!   interval timer   ──→ SessionReaper ─────────┘
//! ```
//!
//! Every read or write of the session slot, the lock output or the phase
//! happens while holding the one interlock mutex. Device and storage I/O
//! never happens while holding it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kc_01_hardware::{Actuator, LockActuator, TagSource, WeightSource};
use kc_02_ledger::{UserDirectory, WeightLedgerApi};
use parking_lot::{Mutex, MutexGuard};
use shared_bus::EventPublisher;
use shared_types::TimeSource;
use tracing::{info, warn};

use crate::domain::{
    DisposalPhase, KioskStatus, Session, SessionConfig, SessionStore, SessionView,
};

/// State guarded by the kiosk's single critical section.
pub struct Interlock {
    pub sessions: SessionStore,
    pub lock: LockActuator,
    pub phase: DisposalPhase,
}

impl Interlock {
    /// Clear the session, lock, go `Idle`. Returns the cleared session.
    pub fn force_safe_state(&mut self) -> Option<Session> {
        let cleared = self.sessions.delete();
        self.lock.lock();
        self.phase = DisposalPhase::Idle;
        cleared
    }

    /// Unlocked only with a live session, or mid-finalization.
    pub fn is_safe(&self, now: DateTime<Utc>) -> bool {
        self.lock.is_locked()
            || self.sessions.live(now).is_some()
            || matches!(self.phase, DisposalPhase::Finalizing { .. })
    }

    fn status(&self, now: DateTime<Utc>) -> KioskStatus {
        let confirmed = matches!(self.phase, DisposalPhase::Disposing { confirmed: true, .. });
        KioskStatus {
            phase: self.phase.name(),
            lock: self.lock.state(),
            session: self.sessions.get().map(|s| SessionView {
                session_id: s.id,
                uid: s.uid().clone(),
                baseline_weight: s.baseline,
                created_at: s.created_at,
                expires_at: s.expires_at,
                confirmed: confirmed && self.phase.session() == Some(s.id),
                expired: s.is_expired(now),
            }),
        }
    }
}

/// Collaborators the kiosk is wired with.
pub struct KioskPorts {
    pub tags: Arc<dyn TagSource>,
    pub scale: Arc<dyn WeightSource>,
    pub users: Arc<dyn UserDirectory>,
    pub ledger: Arc<dyn WeightLedgerApi>,
    pub publisher: Arc<dyn EventPublisher>,
    pub clock: Arc<dyn TimeSource>,
    pub actuator: Arc<dyn Actuator>,
}

/// Shared kiosk state and ports.
pub struct KioskContext {
    pub(crate) tags: Arc<dyn TagSource>,
    pub(crate) scale: Arc<dyn WeightSource>,
    pub(crate) users: Arc<dyn UserDirectory>,
    pub(crate) ledger: Arc<dyn WeightLedgerApi>,
    pub(crate) publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn TimeSource>,
    config: SessionConfig,
    interlock: Mutex<Interlock>,
}

impl KioskContext {
    /// Drives the lock output to `Locked` before returning.
    pub fn new(ports: KioskPorts, config: SessionConfig) -> Arc<Self> {
        let interlock = Interlock {
            sessions: SessionStore::new(),
            lock: LockActuator::new(ports.actuator),
            phase: DisposalPhase::Idle,
        };
        info!(
            ttl_minutes = config.ttl_minutes,
            reap_after_minutes = config.reap_after_minutes,
            "Kiosk context initialized"
        );
        Arc::new(Self {
            tags: ports.tags,
            scale: ports.scale,
            users: ports.users,
            ledger: ports.ledger,
            publisher: ports.publisher,
            clock: ports.clock,
            config,
            interlock: Mutex::new(interlock),
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Enter the critical section. Never hold the guard across I/O.
    pub fn interlock(&self) -> MutexGuard<'_, Interlock> {
        self.interlock.lock()
    }

    pub fn status(&self) -> KioskStatus {
        let now = self.now();
        self.interlock().status(now)
    }

    /// Safe-state primitive shared by reset, error paths and shutdown.
    pub fn force_safe_state(&self, reason: &str) -> Option<Session> {
        let cleared = self.interlock().force_safe_state();
        match &cleared {
            Some(session) => warn!(
                reason,
                uid = %session.uid(),
                session = %session.id,
                "Session cleared, kiosk locked"
            ),
            None => info!(reason, "Kiosk locked"),
        }
        cleared
    }

    /// Final safe state before the process exits.
    pub fn shutdown(&self) {
        self.force_safe_state("shutdown");
    }
}
