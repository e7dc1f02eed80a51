// ABOUTME: Opaque server-side session lifecycle on top of the data store
// ABOUTME: Issues, looks up, refreshes, and terminates user sessions with lazy expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::warn;

use crate::database::{
    CreateSessionParams, DataStore, Database, DatabaseError, UpdateSessionParams,
};
use crate::models::Session;

/// Session manager failure modes
///
/// `InvalidSession` covers both missing and expired sessions; callers map it
/// to Unauthenticated. The remaining variants are store failures mapped to
/// Internal.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is invalid or expired")]
    InvalidSession,
    #[error("failed to start session")]
    Start(#[source] DatabaseError),
    #[error("failed to fetch session")]
    Fetch(#[source] DatabaseError),
    #[error("failed to end session")]
    End(#[source] DatabaseError),
    #[error("failed to refresh session")]
    Refresh(#[source] DatabaseError),
}

/// Owns session lifecycle; shared by value across request tasks
#[derive(Clone)]
pub struct SessionManager {
    store: Database,
    ttl: Duration,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Database, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Create a session for `subject` expiring one TTL from now
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Start`] when the store insert fails.
    pub async fn start(&self, subject: i64) -> Result<Session, SessionError> {
        self.store
            .create_session(CreateSessionParams {
                user_id: subject,
                expires_at: Utc::now() + self.ttl,
            })
            .await
            .map_err(SessionError::Start)
    }

    /// Look up a live session by id
    ///
    /// Expired sessions are rejected but not deleted; a separate sweeper may
    /// garbage-collect them.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidSession`] for a missing or expired
    /// session, [`SessionError::Fetch`] for other store failures.
    pub async fn get(&self, session_id: &str) -> Result<Session, SessionError> {
        let session = self
            .store
            .get_session_by_id(session_id)
            .await
            .map_err(|e| match e {
                DatabaseError::SessionNotFound => SessionError::InvalidSession,
                other => SessionError::Fetch(other),
            })?;

        if Utc::now() >= session.expires_at {
            warn!(session_id, "rejected expired session");
            return Err(SessionError::InvalidSession);
        }

        Ok(session)
    }

    /// Terminate a session by id
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::End`] when the store delete fails. Ending a
    /// session that does not exist succeeds (store deletes are idempotent).
    pub async fn end(&self, session_id: &str) -> Result<(), SessionError> {
        self.store
            .delete_session_by_id(session_id)
            .await
            .map_err(SessionError::End)
    }

    /// Extend a session's expiry by one TTL, keeping its id
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidSession`] if the session does not
    /// exist, [`SessionError::Refresh`] for other store failures.
    pub async fn refresh(&self, session_id: &str) -> Result<DateTime<Utc>, SessionError> {
        let expires_at = Utc::now() + self.ttl;
        self.store
            .update_session(UpdateSessionParams {
                session_id: session_id.to_owned(),
                expires_at,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::SessionNotFound => SessionError::InvalidSession,
                other => SessionError::Refresh(other),
            })?;
        Ok(expires_at)
    }
}
