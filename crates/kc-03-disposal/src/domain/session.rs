//! # Session Store
//!
//! The kiosk's single session slot. There is never more than one session,
//! so the "key" is implicit; the [`SessionId`] exists only so that a
//! conditional delete can tell one occupant of the slot from the next.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Uid, User, Weight};
use uuid::Uuid;

/// Identity of one session, distinct across the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An authenticated disposal in progress. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user: User,
    pub baseline: Weight,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User, baseline: Weight, now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            id: SessionId::new(),
            user,
            baseline,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn uid(&self) -> &Uid {
        &self.user.uid
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}

/// Expiring single-slot session storage.
#[derive(Debug, Default)]
pub struct SessionStore {
    slot: Option<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `session` in the slot, returning any previous occupant.
    pub fn create(&mut self, session: Session) -> Option<Session> {
        self.slot.replace(session)
    }

    /// The occupant, expired or not.
    pub fn get(&self) -> Option<&Session> {
        self.slot.as_ref()
    }

    /// The occupant if it has not expired at `now`.
    pub fn live(&self, now: DateTime<Utc>) -> Option<&Session> {
        self.slot.as_ref().filter(|s| !s.is_expired(now))
    }

    pub fn delete(&mut self) -> Option<Session> {
        self.slot.take()
    }

    /// Remove the occupant only if `predicate` holds for it. Check and
    /// removal happen in one call, under whatever exclusion the caller holds.
    pub fn delete_if(&mut self, predicate: impl FnOnce(&Session) -> bool) -> Option<Session> {
        if self.slot.as_ref().is_some_and(predicate) {
            self.slot.take()
        } else {
            None
        }
    }
}
