//! # Session Reaper
//!
//! Timer-driven half of the kiosk. Every `reap_interval` it looks at the
//! session slot and, if the occupant is older than `reap_after`, removes it
//! and locks the barrier.
//!
//! A tick is split in two: [`SessionReaper::scan`] snapshots the occupant
//! and [`SessionReaper::reap`] re-checks that snapshot inside the critical
//! section. A session that was replaced between the two steps is left
//! alone, so the reaper can never delete a newer user's session or lock
//! the barrier on them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kiosk_telemetry::metrics::SESSIONS_REAPED;
use shared_types::Uid;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::context::KioskContext;
use crate::domain::{DisposalPhase, SessionId};

/// Snapshot of the session slot taken outside the critical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReapCandidate {
    pub session: SessionId,
    pub uid: Uid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// Session removed, barrier locked.
    Reaped,
    /// A different session occupies the slot now.
    Replaced,
    NotExpired,
    Absent,
}

pub struct SessionReaper {
    ctx: Arc<KioskContext>,
}

impl SessionReaper {
    pub fn new(ctx: Arc<KioskContext>) -> Self {
        Self { ctx }
    }

    pub fn scan(&self) -> Option<ReapCandidate> {
        self.ctx.interlock().sessions.get().map(|s| ReapCandidate {
            session: s.id,
            uid: s.uid().clone(),
            created_at: s.created_at,
        })
    }

    /// Remove `candidate` if it still occupies the slot and is older than
    /// the reap threshold at `now`.
    pub fn reap(&self, candidate: &ReapCandidate, now: DateTime<Utc>) -> ReapOutcome {
        let threshold = self.ctx.config().reap_after();
        let mut il = self.ctx.interlock();

        match il.sessions.get() {
            None => return ReapOutcome::Absent,
            Some(s) if s.id != candidate.session => return ReapOutcome::Replaced,
            Some(s) if s.age(now) <= threshold => return ReapOutcome::NotExpired,
            Some(_) => {}
        }

        il.sessions.delete_if(|s| s.id == candidate.session);
        il.lock.lock();
        if il.phase.session() == Some(candidate.session) {
            il.phase = DisposalPhase::Idle;
        }
        drop(il);

        SESSIONS_REAPED.inc();
        info!(
            uid = %candidate.uid,
            session = %candidate.session,
            age_minutes = (now - candidate.created_at).num_minutes(),
            "Abandoned session reaped, kiosk locked"
        );
        ReapOutcome::Reaped
    }

    pub fn tick(&self) -> ReapOutcome {
        match self.scan() {
            Some(candidate) => self.reap(&candidate, self.ctx.now()),
            None => ReapOutcome::Absent,
        }
    }

    /// Tick until `shutdown` flips to `true` or its sender goes away.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let period = self.ctx.config().reap_interval();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = period.as_secs(), "Session reaper started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let outcome = self.tick();
                    debug!(?outcome, "Reaper tick");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Session reaper stopped");
    }
}
