// ABOUTME: Service layer implementing the user-facing and client-facing RPC semantics
// ABOUTME: Bundles both services plus their shared components into ServerResources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

pub mod client;
pub mod user;

pub use client::{ClientAuthService, RegisteredClient, TokenPair};
pub use user::UserAuthService;

use crate::config::ServerConfig;
use crate::crypto::PasswordHasher;
use crate::database::Database;
use crate::session::SessionManager;
use crate::tokens::TokenCodec;

/// Everything a request handler needs, built once at startup and shared
/// behind an `Arc`
pub struct ServerResources {
    pub user_auth: UserAuthService,
    pub client_auth: ClientAuthService,
}

impl ServerResources {
    /// Wire both services over a connected store
    #[must_use]
    pub fn new(store: Database, config: &ServerConfig) -> Self {
        let hasher = PasswordHasher::new();
        let sessions = SessionManager::new(store.clone(), config.session_ttl);
        let codec = TokenCodec::new(&config.jwt);

        Self {
            user_auth: UserAuthService::new(store.clone(), sessions, hasher),
            client_auth: ClientAuthService::new(store, hasher, codec),
        }
    }
}
