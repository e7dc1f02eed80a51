// ABOUTME: Persisted entity types for users, clients, sessions, and authorizations
// ABOUTME: Value structs owned by the data store; services hold copies for one RPC
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A human principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable numeric id assigned by the store
    pub id: i64,
    /// Unique, case-sensitive username
    pub username: String,
    /// bcrypt hash of the password; never the plaintext
    pub hashed_password: String,
    /// Unique email address
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An application principal
///
/// The plaintext client secret is returned exactly once from registration and
/// never persisted; only `hashed_secret` survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Stable numeric id assigned by the store
    pub id: i64,
    /// Unique client name
    pub name: String,
    /// Unique client website
    pub website: String,
    /// bcrypt hash of the client secret
    pub hashed_secret: String,
    /// Free-form scope string supplied at registration
    pub scope: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An active user sign-in
///
/// The id is a capability token: an unguessable random string handed back to
/// the user agent and presented on subsequent RPCs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session id generated by the store
    pub id: String,
    /// Owning user
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    /// A session is valid iff it exists and `now < expires_at`
    pub expires_at: DateTime<Utc>,
}

/// A user's grant to a client; doubles as the authorization code record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorization {
    /// Opaque authorization code, primary key, generated by the store
    pub auth_code: String,
    /// Granting user
    pub user_id: i64,
    /// Grantee client
    pub client_id: i64,
    /// Scope of the grant
    pub scope: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
}
