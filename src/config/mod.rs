// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Orchestrates loading of server, database, and token configuration from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

//! Environment-based configuration
//!
//! Configuration is loaded once at process start and passed by value into
//! component constructors; there is no global mutable state.

pub mod database;
pub mod jwt;

use std::env;

use anyhow::Result;
use chrono::Duration;

pub use database::PostgresConfig;
pub use jwt::JwtConfig;

/// Default HTTP listen port, matching the historical gRPC listen port
const DEFAULT_HTTP_PORT: u16 = 5051;

/// Default session lifetime in seconds (1 hour)
const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub http_port: u16,
    /// Lifetime of opaque user sessions
    pub session_ttl: Duration,
    /// Store connection settings
    pub database: PostgresConfig,
    /// Token codec settings
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is out
    /// of range; the server must not start with partial configuration.
    pub fn from_env() -> Result<Self> {
        let session_ttl_secs = env::var("OAUTH_SESSION_EXPIRATION_TIME")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);
        anyhow::ensure!(
            session_ttl_secs > 0,
            "OAUTH_SESSION_EXPIRATION_TIME must be greater than zero"
        );

        Ok(Self {
            host: env::var("HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned()),
            http_port: env::var("HTTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_HTTP_PORT),
            session_ttl: Duration::seconds(session_ttl_secs),
            database: PostgresConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
        })
    }
}
