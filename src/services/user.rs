// ABOUTME: User-facing auth operations: register, login, logout, and consent
// ABOUTME: Maps component errors to wire statuses without leaking which credential failed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use tracing::{error, info, warn};

use crate::crypto::{PasswordError, PasswordHasher};
use crate::database::{CreateAuthorizationParams, CreateUserParams, DataStore, Database, DatabaseError};
use crate::errors::{AppError, AppResult};
use crate::session::{SessionError, SessionManager};

/// Uniform credential-failure message; byte-identical whether the username
/// was unknown or the password wrong
const MSG_INVALID_USERNAME_OR_PASSWORD: &str = "invalid username or password";
const MSG_INVALID_SESSION: &str = "invalid or expired session";
const MSG_CLIENT_DOES_NOT_EXIST: &str = "client doesn't exist";

/// User-facing authentication service
#[derive(Clone)]
pub struct UserAuthService {
    store: Database,
    sessions: SessionManager,
    hasher: PasswordHasher,
}

impl UserAuthService {
    #[must_use]
    pub fn new(store: Database, sessions: SessionManager, hasher: PasswordHasher) -> Self {
        Self {
            store,
            sessions,
            hasher,
        }
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// Returns `Internal` on hash or store failure; a uniqueness collision is
    /// surfaced as `Internal` in this version rather than a conflict status.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> AppResult<()> {
        info!(username, email, "register request received");

        let hashed_password = self.hash_on_blocking_pool(password).await?;

        self.store
            .create_user(CreateUserParams {
                username: username.to_owned(),
                hashed_password,
                email: email.to_owned(),
            })
            .await
            .map_err(|e| {
                error!(username, "error creating user in store: {e}");
                AppError::internal("failed to create user")
            })?;

        info!(username, "user registered successfully");
        Ok(())
    }

    /// Authenticate a user and start a session; returns the session id
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` with a uniform message for unknown username
    /// or wrong password, `Internal` for store, hash, or session failures.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        info!(username, "login request received");

        let user = self
            .store
            .get_user_by_username(username)
            .await
            .map_err(|e| match e {
                DatabaseError::UserNotFound => {
                    warn!(username, "login rejected: unknown username");
                    AppError::unauthenticated(MSG_INVALID_USERNAME_OR_PASSWORD)
                }
                other => {
                    error!(username, "error retrieving user by username: {other}");
                    AppError::internal("failed to fetch user")
                }
            })?;

        self.verify_on_blocking_pool(user.hashed_password.clone(), password)
            .await
            .map_err(|e| match e {
                VerifyFailure::Mismatch => {
                    warn!(username, "login rejected: wrong password");
                    AppError::unauthenticated(MSG_INVALID_USERNAME_OR_PASSWORD)
                }
                VerifyFailure::Internal(msg) => {
                    error!(username, "error comparing password: {msg}");
                    AppError::internal("failed to verify password")
                }
            })?;

        let session = self.sessions.start(user.id).await.map_err(|e| {
            error!(username, "error starting session: {e}");
            AppError::internal("failed to start session")
        })?;

        info!(username, "user logged in successfully");
        Ok(session.id)
    }

    /// Terminate the session named by `session_id`
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for an invalid session, `Internal` for
    /// store failures.
    pub async fn logout(&self, session_id: &str) -> AppResult<()> {
        info!(session_id, "logout request received");

        self.sessions.end(session_id).await.map_err(|e| match e {
            SessionError::InvalidSession => {
                warn!(session_id, "logout rejected: invalid session");
                AppError::unauthenticated(MSG_INVALID_SESSION)
            }
            other => {
                error!(session_id, "error ending session: {other}");
                AppError::internal("failed to end session")
            }
        })?;

        info!(session_id, "user logged out successfully");
        Ok(())
    }

    /// Record the signed-in user's consent for `client_id`, creating an
    /// authorization row with a fresh code
    ///
    /// Repeat consent for the same (user, client) appends another row; the
    /// grant history is append-only.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for an invalid or expired session,
    /// `InvalidArgument` for an unknown client, `Internal` otherwise.
    pub async fn consent(&self, session_id: &str, client_id: i64) -> AppResult<()> {
        info!(session_id, client_id, "consent request received");

        let session = self.sessions.get(session_id).await.map_err(|e| match e {
            SessionError::InvalidSession => {
                warn!(session_id, "consent rejected: invalid session");
                AppError::unauthenticated(MSG_INVALID_SESSION)
            }
            other => {
                error!(session_id, "error validating session: {other}");
                AppError::internal("failed to fetch session")
            }
        })?;

        let client = self
            .store
            .get_client_by_id(client_id)
            .await
            .map_err(|e| match e {
                DatabaseError::ClientNotFound => {
                    warn!(client_id, "consent rejected: unknown client");
                    AppError::invalid_argument(MSG_CLIENT_DOES_NOT_EXIST)
                }
                other => {
                    error!(client_id, "error fetching client: {other}");
                    AppError::internal("failed to fetch client")
                }
            })?;

        // Per-grant scope plumbing is not wired yet; grants carry an empty scope.
        self.store
            .create_authorization(CreateAuthorizationParams {
                user_id: session.user_id,
                client_id: client.id,
                scope: String::new(),
            })
            .await
            .map_err(|e| {
                error!(client_id, "error creating authorization: {e}");
                AppError::internal("failed to create authorization")
            })?;

        info!(session_id, client_id, "user consent recorded");
        Ok(())
    }

    /// Run the KDF on the blocking pool; bcrypt stalls a worker otherwise
    async fn hash_on_blocking_pool(&self, plaintext: &str) -> AppResult<String> {
        let hasher = self.hasher;
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| {
                error!("password hashing task failed to join: {e}");
                AppError::internal("hashing task failed")
            })?
            .map_err(|e| {
                error!("error hashing password: {e}");
                AppError::internal("failed to hash password")
            })
    }

    async fn verify_on_blocking_pool(
        &self,
        hashed: String,
        plaintext: &str,
    ) -> Result<(), VerifyFailure> {
        let hasher = self.hasher;
        let plaintext = plaintext.to_owned();

        let outcome = tokio::task::spawn_blocking(move || hasher.verify(&hashed, &plaintext))
            .await
            .map_err(|e| VerifyFailure::Internal(format!("verify task failed to join: {e}")))?;

        match outcome {
            Ok(()) => Ok(()),
            Err(PasswordError::Mismatch) => Err(VerifyFailure::Mismatch),
            Err(PasswordError::Hash(e)) => Err(VerifyFailure::Internal(e.to_string())),
        }
    }
}

enum VerifyFailure {
    Mismatch,
    Internal(String),
}
