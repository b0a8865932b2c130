//! Admin session store.
//!
//! A session is an opaque bearer token mapped to its expiry instant. Tokens
//! are 256 random bits, base64-encoded, and live for [`SESSION_TTL`]. Expired
//! sessions are removed lazily, the first time they are presented.
//!
//! Two backends implement [`SessionStore`]:
//! - [`MemorySessionStore`] (default): process memory, so a restart signs
//!   every admin out.
//! - [`crate::db::PgSessionStore`]: the `admin_sessions` table, shared by all
//!   instances and surviving restarts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeDelta, Utc};
use mockall::automock;
use rand::RngCore;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::db::RepositoryError;

/// How long an issued token stays valid.
pub const SESSION_TTL: TimeDelta = TimeDelta::hours(24);

/// Token length in bytes before encoding.
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Storage(#[from] RepositoryError),
}

#[automock]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session and return its bearer token.
    async fn issue(&self) -> Result<String, SessionError>;

    /// Whether `token` names a live session. Expired sessions are deleted.
    async fn is_valid(&self, token: &str) -> Result<bool, SessionError>;

    /// Delete the session, if any. Idempotent.
    async fn revoke(&self, token: &str) -> Result<(), SessionError>;
}

/// Generate a fresh bearer token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

// =============================================================================
// Clock
// =============================================================================

/// Source of the current time for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Sessions held in process memory.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("sessions", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn issue(&self) -> Result<String, SessionError> {
        let token = generate_token();
        let expires_at = self.clock.now() + SESSION_TTL;
        self.sessions.write().await.insert(token.clone(), expires_at);
        Ok(token)
    }

    async fn is_valid(&self, token: &str) -> Result<bool, SessionError> {
        let Some(expires_at) = self.sessions.read().await.get(token).copied() else {
            return Ok(false);
        };

        if self.clock.now() > expires_at {
            self.sessions.write().await.remove(token);
            return Ok(false);
        }

        Ok(true)
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}
