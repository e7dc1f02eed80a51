// ABOUTME: In-memory data store backend for tests and local development
// ABOUTME: Enforces the same uniqueness, not-found, and id-generation semantics as Postgres
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::{
    generate_opaque_id, CreateAuthorizationParams, CreateClientParams, CreateSessionParams,
    CreateUserParams, DataStore, DatabaseError, UpdateSessionParams, AUTH_CODE_TTL_MINUTES,
};
use crate::models::{Authorization, Client, Session, User};

#[derive(Default, Debug)]
struct Tables {
    users: HashMap<i64, User>,
    next_user_id: i64,
    sessions: HashMap<String, Session>,
    clients: HashMap<i64, Client>,
    next_client_id: i64,
    authorizations: HashMap<String, Authorization>,
}

/// In-memory store; one coarse lock stands in for the relational engine's
/// transactional guarantees
#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, DatabaseError> {
        self.inner
            .lock()
            .map_err(|_| DatabaseError::Connection("memory store lock poisoned".to_owned()))
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn create_user(&self, params: CreateUserParams) -> Result<User, DatabaseError> {
        let mut tables = self.lock()?;

        let duplicate = tables
            .users
            .values()
            .any(|u| u.username == params.username || u.email == params.email);
        if duplicate {
            return Err(DatabaseError::UserCreation {
                reason: "username or email already exists".to_owned(),
            });
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            username: params.username,
            hashed_password: params.hashed_password,
            email: params.email,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: i64) -> Result<User, DatabaseError> {
        let tables = self.lock()?;
        tables
            .users
            .get(&user_id)
            .cloned()
            .ok_or(DatabaseError::UserNotFound)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        let tables = self.lock()?;
        tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(DatabaseError::UserNotFound)
    }

    async fn create_session(&self, params: CreateSessionParams) -> Result<Session, DatabaseError> {
        let session_id = generate_opaque_id()?;
        let mut tables = self.lock()?;

        if !tables.users.contains_key(&params.user_id) {
            return Err(DatabaseError::SessionCreation {
                reason: format!("user {} does not exist", params.user_id),
            });
        }

        let session = Session {
            id: session_id,
            user_id: params.user_id,
            created_at: Utc::now(),
            expires_at: params.expires_at,
        };
        tables.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get_session_by_id(&self, session_id: &str) -> Result<Session, DatabaseError> {
        let tables = self.lock()?;
        tables
            .sessions
            .get(session_id)
            .cloned()
            .ok_or(DatabaseError::SessionNotFound)
    }

    async fn delete_session_by_id(&self, session_id: &str) -> Result<(), DatabaseError> {
        let mut tables = self.lock()?;
        tables.sessions.remove(session_id);
        Ok(())
    }

    async fn update_session(&self, params: UpdateSessionParams) -> Result<Session, DatabaseError> {
        let mut tables = self.lock()?;
        let session = tables
            .sessions
            .get_mut(&params.session_id)
            .ok_or(DatabaseError::SessionNotFound)?;
        session.expires_at = params.expires_at;
        Ok(session.clone())
    }

    async fn create_client(&self, params: CreateClientParams) -> Result<Client, DatabaseError> {
        let mut tables = self.lock()?;

        let duplicate = tables
            .clients
            .values()
            .any(|c| c.name == params.name || c.website == params.website);
        if duplicate {
            return Err(DatabaseError::ClientCreation {
                reason: "name or website already exists".to_owned(),
            });
        }

        tables.next_client_id += 1;
        let now = Utc::now();
        let client = Client {
            id: tables.next_client_id,
            name: params.name,
            website: params.website,
            hashed_secret: params.hashed_secret,
            scope: params.scope,
            created_at: now,
            updated_at: now,
        };
        tables.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn get_client_by_id(&self, client_id: i64) -> Result<Client, DatabaseError> {
        let tables = self.lock()?;
        tables
            .clients
            .get(&client_id)
            .cloned()
            .ok_or(DatabaseError::ClientNotFound)
    }

    async fn create_authorization(
        &self,
        params: CreateAuthorizationParams,
    ) -> Result<Authorization, DatabaseError> {
        let auth_code = generate_opaque_id()?;
        let mut tables = self.lock()?;

        if !tables.users.contains_key(&params.user_id) {
            return Err(DatabaseError::AuthorizationCreation {
                reason: format!("user {} does not exist", params.user_id),
            });
        }
        if !tables.clients.contains_key(&params.client_id) {
            return Err(DatabaseError::AuthorizationCreation {
                reason: format!("client {} does not exist", params.client_id),
            });
        }

        let now = Utc::now();
        let authorization = Authorization {
            auth_code,
            user_id: params.user_id,
            client_id: params.client_id,
            scope: params.scope,
            created_at: now,
            expires_at: now + Duration::minutes(AUTH_CODE_TTL_MINUTES),
            is_revoked: false,
        };
        tables
            .authorizations
            .insert(authorization.auth_code.clone(), authorization.clone());
        Ok(authorization)
    }

    async fn get_authorization_by_auth_code(
        &self,
        auth_code: &str,
    ) -> Result<Authorization, DatabaseError> {
        let tables = self.lock()?;
        tables
            .authorizations
            .get(auth_code)
            .cloned()
            .ok_or(DatabaseError::AuthorizationNotFound)
    }

    async fn get_authorization_by_user_and_client(
        &self,
        user_id: i64,
        client_id: i64,
    ) -> Result<Authorization, DatabaseError> {
        let tables = self.lock()?;
        tables
            .authorizations
            .values()
            .filter(|a| a.user_id == user_id && a.client_id == client_id)
            .max_by_key(|a| a.created_at)
            .cloned()
            .ok_or(DatabaseError::AuthorizationNotFound)
    }

    async fn revoke_authorizations_by_user_id(&self, user_id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.lock()?;
        for authorization in tables.authorizations.values_mut() {
            if authorization.user_id == user_id {
                authorization.is_revoked = true;
            }
        }
        Ok(())
    }
}
