// ABOUTME: Token codec configuration loaded from OAUTH_JWT_* variables
// ABOUTME: Validates secret, issuer, audience, algorithm, and both token lifetimes at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use std::env;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use jsonwebtoken::Algorithm;

const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;
const DEFAULT_HEADER_NAME: &str = "Authorization";
const DEFAULT_HEADER_PREFIX: &str = "Bearer";

/// Signed-token settings shared by the access and refresh token paths
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC signing secret
    pub secret: String,
    /// `iss` claim stamped into every token
    pub issuer: String,
    /// Configured audience; not asserted during validation in this version
    pub audience: String,
    /// Signing algorithm; HMAC family only
    pub algorithm: Algorithm,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Header conventions reserved for client SDKs
    pub header_name: String,
    pub header_prefix: String,
}

impl JwtConfig {
    /// Load token settings from `OAUTH_JWT_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, the algorithm is
    /// not an HMAC variant, or either lifetime is not a positive integer.
    pub fn from_env() -> Result<Self> {
        let secret = env::var("OAUTH_JWT_SECRET")
            .context("OAUTH_JWT_SECRET environment variable is required")?;
        let issuer = env::var("OAUTH_JWT_ISSUER")
            .context("OAUTH_JWT_ISSUER environment variable is required")?;
        let audience = env::var("OAUTH_JWT_AUDIENCE")
            .context("OAUTH_JWT_AUDIENCE environment variable is required")?;

        let algorithm = match env::var("OAUTH_JWT_ALGORITHM") {
            Ok(name) => parse_hmac_algorithm(&name)?,
            Err(_) => DEFAULT_ALGORITHM,
        };

        let access_secs = required_positive_secs("OAUTH_JWT_EXPIRATION_TIME")?;
        let refresh_secs = required_positive_secs("OAUTH_JWT_REFRESH_EXPIRATION_TIME")?;

        Ok(Self {
            secret,
            issuer,
            audience,
            algorithm,
            access_token_ttl: Duration::seconds(access_secs),
            refresh_token_ttl: Duration::seconds(refresh_secs),
            header_name: env::var("OAUTH_JWT_HEADER_NAME")
                .unwrap_or_else(|_| DEFAULT_HEADER_NAME.to_owned()),
            header_prefix: env::var("OAUTH_JWT_HEADER_PREFIX")
                .unwrap_or_else(|_| DEFAULT_HEADER_PREFIX.to_owned()),
        })
    }
}

/// Parse an algorithm name, restricted to the HMAC family the secret supports
fn parse_hmac_algorithm(name: &str) -> Result<Algorithm> {
    match name {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => bail!("OAUTH_JWT_ALGORITHM must be HS256, HS384, or HS512, got {other}"),
    }
}

fn required_positive_secs(var: &str) -> Result<i64> {
    let raw = env::var(var).with_context(|| format!("{var} environment variable is required"))?;
    let secs: i64 = raw
        .parse()
        .with_context(|| format!("{var} must be an integer number of seconds"))?;
    if secs <= 0 {
        bail!("{var} must be greater than zero");
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_hmac_algorithms() {
        assert!(parse_hmac_algorithm("RS256").is_err());
        assert!(parse_hmac_algorithm("none").is_err());
    }

    #[test]
    fn accepts_the_hmac_family() {
        assert_eq!(parse_hmac_algorithm("HS256").unwrap(), Algorithm::HS256);
        assert_eq!(parse_hmac_algorithm("HS384").unwrap(), Algorithm::HS384);
        assert_eq!(parse_hmac_algorithm("HS512").unwrap(), Algorithm::HS512);
    }
}
