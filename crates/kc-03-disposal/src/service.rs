//! # Disposal State Machine
//!
//! Drives one disposal from tag to receipt and owns the actuator-safety
//! invariant: the lock output is `Unlocked` only while a live session
//! exists, or transiently while that session is being finalized.
//!
//! ## Transitions
//!
//! | Operation | Requires | On success | On error |
//! |-----------|----------|------------|----------|
//! | `authenticate` | no live session, nothing in flight | session created, unlocked, `Disposing` | stays locked, `Idle` |
//! | `confirm` | live session, `Disposing` | session marked confirmed | unchanged (expired → cleared, locked) |
//! | `finalize` | confirmed session | ledger updated, locked, session ended | locked, session ended |
//! | `reset` | nothing | locked, no session, `Idle` | n/a |
//!
//! ## Guarantees
//!
//! - The interlock mutex is never held across `.await` or device I/O.
//! - Scoped guards restore the safe state on every exit path of
//!   `authenticate` and `finalize`, including cancellation of the future.
//! - An authentication that completes after a reset is discarded with
//!   `Interrupted` and does not unlock.
//! - A publish failure after a committed ledger write is logged and counted,
//!   never returned.
//! - Once the finalize weight is taken, the ledger write and the broadcast
//!   run in their own task and finish even if the request is dropped.

use std::sync::Arc;

use async_trait::async_trait;
use kiosk_telemetry::metrics::{
    PUBLISH_FAILURES, SESSIONS_COMPLETED, SESSIONS_STARTED, TRANSITION_FAILURES,
};
use shared_bus::DisposalEvent;
use shared_types::{LockState, Uid, User, Weight};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::context::{Interlock, KioskContext};
use crate::domain::{
    AuthOutcome, ConfirmOutcome, DisposalPhase, KioskStatus, Receipt, ResetOutcome, Session,
    SessionId,
};
use crate::error::{DisposalError, DisposalResult};
use crate::ports::DisposalApi;

/// Request-driven half of the kiosk.
pub struct DisposalStateMachine {
    ctx: Arc<KioskContext>,
}

impl DisposalStateMachine {
    pub fn new(ctx: Arc<KioskContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<KioskContext> {
        &self.ctx
    }

    async fn find_user(&self, uid: &Uid) -> DisposalResult<User> {
        let users = self.ctx.users.clone();
        let uid = uid.clone();
        blocking(move || {
            users
                .find_user(&uid)?
                .ok_or(DisposalError::UserNotFound { uid })
        })
        .await
    }

    async fn sample_weight(&self) -> DisposalResult<Weight> {
        let scale = self.ctx.scale.clone();
        blocking(move || scale.sample().map_err(DisposalError::from)).await
    }

    async fn try_authenticate(&self, tag_uid: Uid) -> DisposalResult<AuthOutcome> {
        let attempt = Uuid::new_v4();
        {
            let now = self.ctx.now();
            let mut il = self.ctx.interlock();

            if let Some(active) = il.sessions.live(now) {
                return Err(if active.uid() == &tag_uid {
                    DisposalError::busy("a session is already active for this tag")
                } else {
                    DisposalError::tag_mismatch("another user's session is active")
                });
            }
            match il.phase {
                DisposalPhase::Authenticating { .. } => {
                    return Err(DisposalError::busy("authentication in progress"))
                }
                DisposalPhase::Finalizing { .. } => {
                    return Err(DisposalError::busy("finalization in progress"))
                }
                DisposalPhase::Idle | DisposalPhase::Disposing { .. } => {}
            }
            if let Some(stale) = il.sessions.get() {
                info!(uid = %stale.uid(), session = %stale.id, "Clearing expired session");
                il.force_safe_state();
            }
            il.phase = DisposalPhase::Authenticating { attempt };
        }
        let _guard = AttemptGuard {
            ctx: self.ctx.clone(),
            attempt,
        };

        let user = self.find_user(&tag_uid).await?;
        let baseline = self.sample_weight().await?;

        let now = self.ctx.now();
        let mut il = self.ctx.interlock();
        if il.phase != (DisposalPhase::Authenticating { attempt }) {
            return Err(DisposalError::Interrupted);
        }

        let session = Session::new(user, baseline, now, self.ctx.config().ttl());
        let outcome = AuthOutcome {
            session_started: true,
            session_id: session.id,
            uid: session.user.uid.clone(),
            name: session.user.name.clone(),
            company: session.user.company.clone(),
            baseline_weight: baseline,
            expires_at: session.expires_at,
        };
        il.phase = DisposalPhase::Disposing {
            session: session.id,
            confirmed: false,
        };
        il.sessions.create(session);
        il.lock.unlock();
        drop(il);

        SESSIONS_STARTED.inc();
        info!(
            session = %outcome.session_id,
            name = %outcome.name,
            baseline = %baseline,
            "Session started, barrier unlocked"
        );
        Ok(outcome)
    }

    fn try_confirm(&self, tag_uid: Uid) -> DisposalResult<ConfirmOutcome> {
        let now = self.ctx.now();
        let mut il = self.ctx.interlock();

        let session_id = match il.sessions.get() {
            None => return Err(DisposalError::StaleOrMissingSession),
            Some(s) if s.is_expired(now) => {
                expire(&mut il);
                return Err(DisposalError::StaleOrMissingSession);
            }
            Some(s) if s.uid() != &tag_uid => {
                return Err(DisposalError::tag_mismatch(
                    "tag does not belong to the active session",
                ))
            }
            Some(s) => s.id,
        };

        match il.phase {
            DisposalPhase::Disposing { session, .. } if session == session_id => {
                il.phase = DisposalPhase::Disposing {
                    session,
                    confirmed: true,
                };
                info!(session = %session, "Tag confirmed");
                Ok(ConfirmOutcome {
                    confirmed: true,
                    uid: tag_uid,
                })
            }
            DisposalPhase::Finalizing { .. } => {
                Err(DisposalError::busy("finalization in progress"))
            }
            _ => Err(DisposalError::StaleOrMissingSession),
        }
    }

    async fn try_finalize(&self) -> DisposalResult<Receipt> {
        let session = {
            let now = self.ctx.now();
            let mut il = self.ctx.interlock();

            let Some(session) = il.sessions.get().cloned() else {
                return Err(DisposalError::StaleOrMissingSession);
            };
            if session.is_expired(now) {
                expire(&mut il);
                return Err(DisposalError::StaleOrMissingSession);
            }
            match il.phase {
                DisposalPhase::Disposing {
                    session: id,
                    confirmed,
                } if id == session.id => {
                    if !confirmed {
                        return Err(DisposalError::tag_mismatch(
                            "present the tag again before finishing",
                        ));
                    }
                }
                DisposalPhase::Finalizing { .. } => {
                    return Err(DisposalError::busy("finalization in progress"))
                }
                _ => return Err(DisposalError::StaleOrMissingSession),
            }
            il.phase = DisposalPhase::Finalizing {
                session: session.id,
            };
            session
        };
        let guard = FinalizeGuard {
            ctx: self.ctx.clone(),
            session: session.id,
        };

        let post = self.sample_weight().await?;
        let delta = post - session.baseline;

        let user = session.user.clone();

        // Runs to completion even if this request is dropped.
        let company_total = tokio::spawn(commit(self.ctx.clone(), guard, user.clone(), delta))
            .await
            .map_err(|e| DisposalError::Internal {
                reason: e.to_string(),
            })??;

        let message = format!("{} disposed {} kg", user.name, delta);
        info!(
            uid = %user.uid,
            company = %user.company,
            delta = %delta,
            total = %company_total,
            "{message}"
        );
        Ok(Receipt {
            uid: user.uid,
            name: user.name,
            company: user.company,
            assignment_code: user.assignment_code,
            delta,
            company_total,
            message,
        })
    }
}

#[async_trait]
impl DisposalApi for DisposalStateMachine {
    #[instrument(skip(self))]
    async fn read_tag(&self) -> DisposalResult<Uid> {
        let tags = self.ctx.tags.clone();
        let result = blocking(move || tags.read_tag().map_err(DisposalError::from)).await;
        record_failure("read_tag", &result);
        result
    }

    #[instrument(skip(self, tag_uid), fields(uid = %tag_uid))]
    async fn authenticate(&self, tag_uid: Uid) -> DisposalResult<AuthOutcome> {
        let result = self.try_authenticate(tag_uid).await;
        record_failure("authenticate", &result);
        result
    }

    #[instrument(skip(self, tag_uid), fields(uid = %tag_uid))]
    async fn confirm(&self, tag_uid: Uid) -> DisposalResult<ConfirmOutcome> {
        let result = self.try_confirm(tag_uid);
        record_failure("confirm", &result);
        result
    }

    #[instrument(skip(self))]
    async fn finalize(&self) -> DisposalResult<Receipt> {
        let result = self.try_finalize().await;
        record_failure("finalize", &result);
        result
    }

    #[instrument(skip(self))]
    async fn reset(&self) -> ResetOutcome {
        let cleared = self.ctx.force_safe_state("reset");
        ResetOutcome {
            cleared: cleared.is_some(),
            lock: LockState::Locked,
        }
    }

    fn status(&self) -> KioskStatus {
        self.ctx.status()
    }
}

// =============================================================================
// SCOPED CLEANUP
// =============================================================================

/// Returns an abandoned authentication attempt to `Idle`.
///
/// Does nothing once the attempt has moved on to `Disposing`, or when a
/// reset already replaced it.
struct AttemptGuard {
    ctx: Arc<KioskContext>,
    attempt: Uuid,
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        let mut il = self.ctx.interlock();
        if il.phase == (DisposalPhase::Authenticating { attempt: self.attempt }) {
            il.phase = DisposalPhase::Idle;
            il.lock.lock();
        }
    }
}

/// Ends the finalized session and locks, on every exit from `finalize`.
///
/// If a reset raced ahead and a new session is already live, that session
/// and its unlocked barrier are left alone.
struct FinalizeGuard {
    ctx: Arc<KioskContext>,
    session: SessionId,
}

impl Drop for FinalizeGuard {
    fn drop(&mut self) {
        let now = self.ctx.now();
        let mut il = self.ctx.interlock();
        il.sessions.delete_if(|s| s.id == self.session);

        if il.phase == (DisposalPhase::Finalizing { session: self.session }) {
            il.phase = DisposalPhase::Idle;
            il.lock.lock();
        } else if il.sessions.live(now).is_none() {
            il.lock.lock();
        }
    }
}

/// Books `delta`, ends the session, then broadcasts the delta.
async fn commit(
    ctx: Arc<KioskContext>,
    guard: FinalizeGuard,
    user: User,
    delta: Weight,
) -> DisposalResult<Weight> {
    let ledger = ctx.ledger.clone();
    let (code, company) = (user.assignment_code, user.company.clone());
    let company_total = blocking(move || {
        ledger
            .apply_delta(code, &company, delta)
            .map_err(DisposalError::from)
    })
    .await?;

    // Lock and end the session before talking to the broker.
    drop(guard);
    SESSIONS_COMPLETED.inc();

    publish_delta(&ctx, &user, delta).await;
    Ok(company_total)
}

async fn publish_delta(ctx: &KioskContext, user: &User, delta: Weight) {
    let ledger = ctx.ledger.clone();
    let company = user.company.clone();
    let codes = match blocking(move || ledger.company_codes(&company).map_err(DisposalError::from))
        .await
    {
        Ok(codes) if !codes.is_empty() => codes,
        Ok(_) => vec![user.assignment_code],
        Err(e) => {
            warn!(company = %user.company, error = %e, "Company code lookup failed");
            vec![user.assignment_code]
        }
    };
    let event = DisposalEvent::for_codes(&codes, &user.company, delta);

    if let Err(e) = ctx.publisher.publish(&event).await {
        PUBLISH_FAILURES.inc();
        let e = DisposalError::from(e);
        warn!(code = e.code(), error = %e, "Disposal event not delivered");
    }
}

fn expire(il: &mut Interlock) {
    if let Some(session) = il.force_safe_state() {
        warn!(uid = %session.uid(), session = %session.id, "Session expired, kiosk locked");
    }
}

async fn blocking<T, F>(f: F) -> DisposalResult<T>
where
    F: FnOnce() -> DisposalResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DisposalError::Internal {
            reason: e.to_string(),
        })?
}

fn record_failure<T>(operation: &'static str, result: &DisposalResult<T>) {
    if let Err(e) = result {
        TRANSITION_FAILURES
            .with_label_values(&[operation, e.code()])
            .inc();
        warn!(operation, code = e.code(), error = %e, "Transition failed");
    }
}
