// ABOUTME: PostgreSQL data store backend over sqlx
// ABOUTME: One statement per operation, RETURNING for inserts, schema migration on startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

use super::{
    generate_opaque_id, CreateAuthorizationParams, CreateClientParams, CreateSessionParams,
    CreateUserParams, DataStore, DatabaseError, UpdateSessionParams, AUTH_CODE_TTL_MINUTES,
};
use crate::models::{Authorization, Client, Session, User};

const MAX_CONNECTIONS: u32 = 10;

/// PostgreSQL-backed store
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect a pool to the given `postgres://` URL
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Connection`] if the pool cannot be established.
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                hashed_password TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                expires_at TIMESTAMPTZ NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS clients (
                id BIGSERIAL PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                website TEXT UNIQUE NOT NULL,
                hashed_secret TEXT NOT NULL,
                scope TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS authorizations (
                auth_code TEXT PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id),
                client_id BIGINT NOT NULL REFERENCES clients(id),
                scope TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                expires_at TIMESTAMPTZ NOT NULL,
                is_revoked BOOLEAN NOT NULL DEFAULT FALSE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_authorizations_user_client
             ON authorizations(user_id, client_id)",
        )
        .execute(&self.pool)
        .await?;

        info!("postgres schema migration complete");
        Ok(())
    }
}

fn row_to_user(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        hashed_password: row.try_get("hashed_password")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_session(row: &PgRow) -> Result<Session, sqlx::Error> {
    Ok(Session {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}

fn row_to_client(row: &PgRow) -> Result<Client, sqlx::Error> {
    Ok(Client {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        website: row.try_get("website")?,
        hashed_secret: row.try_get("hashed_secret")?,
        scope: row.try_get("scope")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_authorization(row: &PgRow) -> Result<Authorization, sqlx::Error> {
    Ok(Authorization {
        auth_code: row.try_get("auth_code")?,
        user_id: row.try_get("user_id")?,
        client_id: row.try_get("client_id")?,
        scope: row.try_get("scope")?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
        is_revoked: row.try_get("is_revoked")?,
    })
}

#[async_trait]
impl DataStore for PostgresStore {
    async fn create_user(&self, params: CreateUserParams) -> Result<User, DatabaseError> {
        let row = sqlx::query(
            r"
            INSERT INTO users (username, hashed_password, email)
            VALUES ($1, $2, $3)
            RETURNING id, username, hashed_password, email, created_at, updated_at
            ",
        )
        .bind(&params.username)
        .bind(&params.hashed_password)
        .bind(&params.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::UserCreation {
            reason: e.to_string(),
        })?;

        row_to_user(&row).map_err(DatabaseError::Query)
    }

    async fn get_user_by_id(&self, user_id: i64) -> Result<User, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, username, hashed_password, email, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::UserNotFound)?;

        row_to_user(&row).map_err(DatabaseError::Query)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, username, hashed_password, email, created_at, updated_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::UserNotFound)?;

        row_to_user(&row).map_err(DatabaseError::Query)
    }

    async fn create_session(&self, params: CreateSessionParams) -> Result<Session, DatabaseError> {
        let session_id = generate_opaque_id()?;

        let row = sqlx::query(
            r"
            INSERT INTO sessions (id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, created_at, expires_at
            ",
        )
        .bind(&session_id)
        .bind(params.user_id)
        .bind(params.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::SessionCreation {
            reason: e.to_string(),
        })?;

        row_to_session(&row).map_err(DatabaseError::Query)
    }

    async fn get_session_by_id(&self, session_id: &str) -> Result<Session, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::SessionNotFound)?;

        row_to_session(&row).map_err(DatabaseError::Query)
    }

    async fn delete_session_by_id(&self, session_id: &str) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_session(&self, params: UpdateSessionParams) -> Result<Session, DatabaseError> {
        let row = sqlx::query(
            r"
            UPDATE sessions SET expires_at = $2
            WHERE id = $1
            RETURNING id, user_id, created_at, expires_at
            ",
        )
        .bind(&params.session_id)
        .bind(params.expires_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::SessionNotFound)?;

        row_to_session(&row).map_err(DatabaseError::Query)
    }

    async fn create_client(&self, params: CreateClientParams) -> Result<Client, DatabaseError> {
        let row = sqlx::query(
            r"
            INSERT INTO clients (name, website, hashed_secret, scope)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, website, hashed_secret, scope, created_at, updated_at
            ",
        )
        .bind(&params.name)
        .bind(&params.website)
        .bind(&params.hashed_secret)
        .bind(&params.scope)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::ClientCreation {
            reason: e.to_string(),
        })?;

        row_to_client(&row).map_err(DatabaseError::Query)
    }

    async fn get_client_by_id(&self, client_id: i64) -> Result<Client, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, name, website, hashed_secret, scope, created_at, updated_at
             FROM clients WHERE id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::ClientNotFound)?;

        row_to_client(&row).map_err(DatabaseError::Query)
    }

    async fn create_authorization(
        &self,
        params: CreateAuthorizationParams,
    ) -> Result<Authorization, DatabaseError> {
        let auth_code = generate_opaque_id()?;
        let expires_at = Utc::now() + Duration::minutes(AUTH_CODE_TTL_MINUTES);

        let row = sqlx::query(
            r"
            INSERT INTO authorizations (auth_code, user_id, client_id, scope, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING auth_code, user_id, client_id, scope, created_at, expires_at, is_revoked
            ",
        )
        .bind(&auth_code)
        .bind(params.user_id)
        .bind(params.client_id)
        .bind(&params.scope)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::AuthorizationCreation {
            reason: e.to_string(),
        })?;

        row_to_authorization(&row).map_err(DatabaseError::Query)
    }

    async fn get_authorization_by_auth_code(
        &self,
        auth_code: &str,
    ) -> Result<Authorization, DatabaseError> {
        let row = sqlx::query(
            "SELECT auth_code, user_id, client_id, scope, created_at, expires_at, is_revoked
             FROM authorizations WHERE auth_code = $1",
        )
        .bind(auth_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::AuthorizationNotFound)?;

        row_to_authorization(&row).map_err(DatabaseError::Query)
    }

    async fn get_authorization_by_user_and_client(
        &self,
        user_id: i64,
        client_id: i64,
    ) -> Result<Authorization, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT auth_code, user_id, client_id, scope, created_at, expires_at, is_revoked
            FROM authorizations
            WHERE user_id = $1 AND client_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(user_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::AuthorizationNotFound)?;

        row_to_authorization(&row).map_err(DatabaseError::Query)
    }

    async fn revoke_authorizations_by_user_id(&self, user_id: i64) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE authorizations SET is_revoked = TRUE WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
