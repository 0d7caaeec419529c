//! Explicit session context for identity-scoped operations.
//!
//! # Responsibility
//! - Carry the authenticated username into project-scoped calls.
//! - Define a clear begin/end lifecycle instead of a process-global user.
//!
//! # Invariants
//! - A session only exists after an external credential check succeeded.
//! - `SessionContext::end` clears identity; later scoped calls must fail.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Authenticated identity for one login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    /// Unix epoch milliseconds.
    pub started_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    EmptyUsername,
    NotLoggedIn,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be blank"),
            Self::NotLoggedIn => write!(f, "no active session"),
        }
    }
}

impl Error for SessionError {}

/// Holder of the current session, if any.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: Option<Session>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for a username the credential collaborator accepted.
    ///
    /// Replaces any previous session.
    pub fn begin(&mut self, username: &str) -> Result<&Session, SessionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SessionError::EmptyUsername);
        }
        Ok(self.current.insert(Session {
            username: username.to_string(),
            started_at_ms: now_epoch_ms(),
        }))
    }

    /// Clears the current session. Returns the session that ended.
    pub fn end(&mut self) -> Option<Session> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Returns the current session or `NotLoggedIn`.
    pub fn require(&self) -> Result<&Session, SessionError> {
        self.current.as_ref().ok_or(SessionError::NotLoggedIn)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
