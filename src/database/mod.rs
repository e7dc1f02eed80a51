// ABOUTME: Data store abstraction owning all persisted entity state
// ABOUTME: Defines the DataStore trait, typed DatabaseError kinds, and opaque id generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

//! # Data Store
//!
//! The store is the only component permitted to allocate opaque identifiers
//! (session ids, authorization codes); they come from a cryptographically
//! secure RNG. Each public operation is a single logical transaction, and
//! not-found is a dedicated error kind per entity so services can pick the
//! right client-facing failure without string matching.

pub mod factory;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;
use tracing::error;

use crate::models::{Authorization, Client, Session, User};

pub use factory::Database;

/// Authorization codes expire this many minutes after creation
pub(crate) const AUTH_CODE_TTL_MINUTES: i64 = 10;

/// Data store failure modes
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("user not found")]
    UserNotFound,
    #[error("client not found")]
    ClientNotFound,
    #[error("session not found")]
    SessionNotFound,
    #[error("authorization not found")]
    AuthorizationNotFound,
    /// Unique violation or I/O failure while inserting a user
    #[error("failed to create user: {reason}")]
    UserCreation { reason: String },
    #[error("failed to create session: {reason}")]
    SessionCreation { reason: String },
    #[error("failed to create client: {reason}")]
    ClientCreation { reason: String },
    #[error("failed to create authorization: {reason}")]
    AuthorizationCreation { reason: String },
    /// The system RNG failed; the store cannot mint identifiers
    #[error("failed to generate opaque identifier")]
    IdGeneration,
    #[error("database query failed")]
    Query(#[from] sqlx::Error),
    #[error("database connection failed: {0}")]
    Connection(String),
}

/// Inputs for [`DataStore::create_user`]
#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub hashed_password: String,
    pub email: String,
}

/// Inputs for [`DataStore::create_session`]; the store generates the id
#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Inputs for [`DataStore::update_session`]
#[derive(Debug, Clone)]
pub struct UpdateSessionParams {
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Inputs for [`DataStore::create_client`]
#[derive(Debug, Clone)]
pub struct CreateClientParams {
    pub name: String,
    pub website: String,
    pub scope: String,
    pub hashed_secret: String,
}

/// Inputs for [`DataStore::create_authorization`]; the store generates the
/// code and stamps the expiry
#[derive(Debug, Clone)]
pub struct CreateAuthorizationParams {
    pub user_id: i64,
    pub client_id: i64,
    pub scope: String,
}

/// Transactional CRUD over users, clients, sessions, and authorizations
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Insert a new user; the store assigns id and timestamps
    async fn create_user(&self, params: CreateUserParams) -> Result<User, DatabaseError>;

    async fn get_user_by_id(&self, user_id: i64) -> Result<User, DatabaseError>;

    async fn get_user_by_username(&self, username: &str) -> Result<User, DatabaseError>;

    /// Insert a new session with a store-generated unguessable id
    async fn create_session(&self, params: CreateSessionParams) -> Result<Session, DatabaseError>;

    async fn get_session_by_id(&self, session_id: &str) -> Result<Session, DatabaseError>;

    /// Delete a session; deleting a session that does not exist is not an error
    async fn delete_session_by_id(&self, session_id: &str) -> Result<(), DatabaseError>;

    /// Update a session's expiry, keeping its id
    async fn update_session(&self, params: UpdateSessionParams) -> Result<Session, DatabaseError>;

    /// Insert a new client; the store assigns id and timestamps
    async fn create_client(&self, params: CreateClientParams) -> Result<Client, DatabaseError>;

    async fn get_client_by_id(&self, client_id: i64) -> Result<Client, DatabaseError>;

    /// Insert a new authorization with a store-generated code expiring
    /// [`AUTH_CODE_TTL_MINUTES`] from now
    async fn create_authorization(
        &self,
        params: CreateAuthorizationParams,
    ) -> Result<Authorization, DatabaseError>;

    async fn get_authorization_by_auth_code(
        &self,
        auth_code: &str,
    ) -> Result<Authorization, DatabaseError>;

    /// Fetch the most recent authorization for a (user, client) pair
    async fn get_authorization_by_user_and_client(
        &self,
        user_id: i64,
        client_id: i64,
    ) -> Result<Authorization, DatabaseError>;

    /// Mark every authorization belonging to `user_id` revoked
    async fn revoke_authorizations_by_user_id(&self, user_id: i64) -> Result<(), DatabaseError>;
}

/// Mint an unguessable opaque identifier: 32 CSPRNG bytes, base64-URL encoded
/// without padding (256 bits of entropy)
pub(crate) fn generate_opaque_id() -> Result<String, DatabaseError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes).map_err(|e| {
        error!("system RNG failure, cannot mint opaque identifiers: {e:?}");
        DatabaseError::IdGeneration
    })?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}
