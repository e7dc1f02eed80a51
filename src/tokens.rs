// ABOUTME: Signed bearer token codec for access and refresh tokens
// ABOUTME: HMAC JWTs carrying a numeric subject, issuer, and expiry; verifiable offline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

//! # Token Codec
//!
//! Access and refresh tokens are self-contained signed tokens, so the
//! exchange hot path never needs a store lookup for the token itself.
//! Sessions, which need explicit termination, are stored opaquely instead
//! (see [`crate::session`]).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;

/// Which lifetime a minted token gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Short-lived credential presented on each protected call
    Access,
    /// Longer-lived credential used only to mint new access tokens
    Refresh,
}

/// Claims handed back to callers after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// The user id the token authorizes as; always positive
    pub subject: i64,
    pub expires_at: DateTime<Utc>,
}

/// Wire-format claim set
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: i64,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Token codec failure modes
#[derive(Debug, Error)]
pub enum TokenError {
    /// Claims violated a signing precondition; a programming error, not a
    /// credential failure
    #[error("invalid token claims: {reason}")]
    InvalidClaims { reason: &'static str },
    /// The token is expired, not yet valid, or carries a bad subject
    #[error("token is invalid or expired")]
    InvalidToken,
    /// Signature or structural verification failed
    #[error("failed to validate token")]
    Validate(#[source] jsonwebtoken::errors::Error),
    /// Signing failed
    #[error("failed to generate token")]
    Generate(#[source] jsonwebtoken::errors::Error),
}

/// Mints and verifies signed bearer tokens
///
/// Holds immutable configuration only; safe to share across request tasks.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from validated configuration
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            algorithm: config.algorithm,
            issuer: config.issuer.clone(),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }

    /// Mint a signed token for `subject`, with the lifetime selected by `token_type`
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidClaims`] if the claims violate a signing
    /// precondition (`subject > 0`, `iat <= now`, `exp > now`), or
    /// [`TokenError::Generate`] if signing itself fails.
    pub fn generate(&self, subject: i64, token_type: TokenType) -> Result<String, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.access_token_ttl,
            TokenType::Refresh => self.refresh_token_ttl,
        };

        let now = Utc::now();
        let claims = WireClaims {
            sub: subject,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Self::check_claims(&claims, now.timestamp())?;

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(TokenError::Generate)
    }

    /// Verify a token string and return its claims
    ///
    /// Checks, in order: algorithm matches configuration, signature verifies,
    /// `now < exp` (zero leeway), `iat <= now`, `subject > 0`. Expiry,
    /// not-yet-valid, and bad-subject all collapse to
    /// [`TokenError::InvalidToken`]; signature and structural failures are
    /// [`TokenError::Validate`] so callers can treat tampering differently.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_aud = false;

        let data = decode::<WireClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
                | jsonwebtoken::errors::ErrorKind::ImmatureSignature => TokenError::InvalidToken,
                _ => TokenError::Validate(e),
            }
        })?;

        let claims = data.claims;
        let now = Utc::now().timestamp();
        if claims.sub <= 0 || claims.iat > now {
            return Err(TokenError::InvalidToken);
        }

        Ok(TokenClaims {
            subject: claims.sub,
            expires_at: DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::InvalidToken)?,
        })
    }

    /// Invalidate a previously issued token
    ///
    /// There is no server-side blacklist; a later `validate` of the same
    /// token is not required to fail.
    pub fn invalidate(&self, _token: &str) {}

    fn check_claims(claims: &WireClaims, now: i64) -> Result<(), TokenError> {
        if claims.sub <= 0 {
            return Err(TokenError::InvalidClaims {
                reason: "subject must be positive",
            });
        }
        if claims.iat > now {
            return Err(TokenError::InvalidClaims {
                reason: "issued in the future",
            });
        }
        if claims.exp <= now {
            return Err(TokenError::InvalidClaims {
                reason: "already expired",
            });
        }
        Ok(())
    }
}
