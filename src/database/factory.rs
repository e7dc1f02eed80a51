// ABOUTME: Data store factory selecting a backend from the connection string
// ABOUTME: Wraps Postgres and in-memory backends behind a single Database enum
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use async_trait::async_trait;
use tracing::info;

use super::memory::MemoryStore;
use super::postgres::PostgresStore;
use super::{
    CreateAuthorizationParams, CreateClientParams, CreateSessionParams, CreateUserParams,
    DataStore, DatabaseError, UpdateSessionParams,
};
use crate::models::{Authorization, Client, Session, User};

/// Store instance wrapper that delegates to the selected backend
#[derive(Clone, Debug)]
pub enum Database {
    Postgres(PostgresStore),
    Memory(MemoryStore),
}

impl Database {
    /// Create a store from a connection string
    ///
    /// `postgres://` / `postgresql://` URLs select the Postgres backend;
    /// `memory:` selects the in-memory backend used by tests and local runs.
    ///
    /// # Errors
    ///
    /// Returns an error for unrecognized URL schemes or connection failure.
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            let store = PostgresStore::connect(database_url).await?;
            info!("connected postgres data store");
            Ok(Self::Postgres(store))
        } else if database_url.starts_with("memory:") {
            info!("using in-memory data store");
            Ok(Self::Memory(MemoryStore::new()))
        } else {
            Err(DatabaseError::Connection(format!(
                "unsupported database URL: {database_url} \
                 (expected postgres://... or memory:)"
            )))
        }
    }

    /// Construct an in-memory store directly; test convenience
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Run schema migration for backends that need one
    ///
    /// # Errors
    ///
    /// Returns an error if DDL execution fails.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        match self {
            Self::Postgres(store) => store.migrate().await,
            Self::Memory(_) => Ok(()),
        }
    }

    /// Descriptive string for the active backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "PostgreSQL",
            Self::Memory(_) => "in-memory",
        }
    }
}

#[async_trait]
impl DataStore for Database {
    async fn create_user(&self, params: CreateUserParams) -> Result<User, DatabaseError> {
        match self {
            Self::Postgres(store) => store.create_user(params).await,
            Self::Memory(store) => store.create_user(params).await,
        }
    }

    async fn get_user_by_id(&self, user_id: i64) -> Result<User, DatabaseError> {
        match self {
            Self::Postgres(store) => store.get_user_by_id(user_id).await,
            Self::Memory(store) => store.get_user_by_id(user_id).await,
        }
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        match self {
            Self::Postgres(store) => store.get_user_by_username(username).await,
            Self::Memory(store) => store.get_user_by_username(username).await,
        }
    }

    async fn create_session(&self, params: CreateSessionParams) -> Result<Session, DatabaseError> {
        match self {
            Self::Postgres(store) => store.create_session(params).await,
            Self::Memory(store) => store.create_session(params).await,
        }
    }

    async fn get_session_by_id(&self, session_id: &str) -> Result<Session, DatabaseError> {
        match self {
            Self::Postgres(store) => store.get_session_by_id(session_id).await,
            Self::Memory(store) => store.get_session_by_id(session_id).await,
        }
    }

    async fn delete_session_by_id(&self, session_id: &str) -> Result<(), DatabaseError> {
        match self {
            Self::Postgres(store) => store.delete_session_by_id(session_id).await,
            Self::Memory(store) => store.delete_session_by_id(session_id).await,
        }
    }

    async fn update_session(&self, params: UpdateSessionParams) -> Result<Session, DatabaseError> {
        match self {
            Self::Postgres(store) => store.update_session(params).await,
            Self::Memory(store) => store.update_session(params).await,
        }
    }

    async fn create_client(&self, params: CreateClientParams) -> Result<Client, DatabaseError> {
        match self {
            Self::Postgres(store) => store.create_client(params).await,
            Self::Memory(store) => store.create_client(params).await,
        }
    }

    async fn get_client_by_id(&self, client_id: i64) -> Result<Client, DatabaseError> {
        match self {
            Self::Postgres(store) => store.get_client_by_id(client_id).await,
            Self::Memory(store) => store.get_client_by_id(client_id).await,
        }
    }

    async fn create_authorization(
        &self,
        params: CreateAuthorizationParams,
    ) -> Result<Authorization, DatabaseError> {
        match self {
            Self::Postgres(store) => store.create_authorization(params).await,
            Self::Memory(store) => store.create_authorization(params).await,
        }
    }

    async fn get_authorization_by_auth_code(
        &self,
        auth_code: &str,
    ) -> Result<Authorization, DatabaseError> {
        match self {
            Self::Postgres(store) => store.get_authorization_by_auth_code(auth_code).await,
            Self::Memory(store) => store.get_authorization_by_auth_code(auth_code).await,
        }
    }

    async fn get_authorization_by_user_and_client(
        &self,
        user_id: i64,
        client_id: i64,
    ) -> Result<Authorization, DatabaseError> {
        match self {
            Self::Postgres(store) => {
                store
                    .get_authorization_by_user_and_client(user_id, client_id)
                    .await
            }
            Self::Memory(store) => {
                store
                    .get_authorization_by_user_and_client(user_id, client_id)
                    .await
            }
        }
    }

    async fn revoke_authorizations_by_user_id(&self, user_id: i64) -> Result<(), DatabaseError> {
        match self {
            Self::Postgres(store) => store.revoke_authorizations_by_user_id(user_id).await,
            Self::Memory(store) => store.revoke_authorizations_by_user_id(user_id).await,
        }
    }
}
