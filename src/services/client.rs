// ABOUTME: Client-facing auth operations: registration, code lookup, exchange, refresh
// ABOUTME: Enforces client authentication and the code-to-client bind check
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use base64::{engine::general_purpose, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{error, info, warn};

use crate::crypto::{PasswordError, PasswordHasher};
use crate::database::{CreateClientParams, DataStore, Database, DatabaseError};
use crate::errors::{AppError, AppResult};
use crate::models::Client;
use crate::tokens::{TokenCodec, TokenError, TokenType};

/// Uniform message for unknown client id and wrong secret alike
const MSG_INVALID_CLIENT: &str = "invalid client id or secret";
const MSG_INVALID_USERNAME: &str = "invalid username";
const MSG_AUTHORIZATION_NOT_FOUND: &str = "authorization record not found";
const MSG_INVALID_AUTH_CODE: &str = "invalid auth code";
const MSG_INVALID_AUTHORIZATION_CODE: &str = "invalid authorization code";
const MSG_INVALID_REFRESH_TOKEN: &str = "invalid refresh token";

/// Client secrets are 32 CSPRNG bytes before base64 encoding
const CLIENT_SECRET_LEN: usize = 32;

/// Result of registering a client; the only moment the plaintext secret exists
/// outside the caller
#[derive(Debug)]
pub struct RegisteredClient {
    pub client_id: i64,
    pub client_secret: String,
}

/// Access and refresh token minted together by the exchange
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Client-facing authentication service
#[derive(Clone)]
pub struct ClientAuthService {
    store: Database,
    hasher: PasswordHasher,
    codec: TokenCodec,
}

impl ClientAuthService {
    #[must_use]
    pub fn new(store: Database, hasher: PasswordHasher, codec: TokenCodec) -> Self {
        Self {
            store,
            hasher,
            codec,
        }
    }

    /// Register a new client application
    ///
    /// Generates a random secret, stores only its hash, and returns the
    /// plaintext exactly once; it is never retrievable again.
    ///
    /// # Errors
    ///
    /// Returns `Internal` on RNG, hash, or store failure (including name or
    /// website uniqueness collisions).
    pub async fn register_client(
        &self,
        name: &str,
        website: &str,
        scope: &str,
    ) -> AppResult<RegisteredClient> {
        info!(name, website, scope, "client registration request received");

        let secret = generate_client_secret().map_err(|e| {
            error!(name, "error generating client secret: {e}");
            AppError::internal("failed to generate client secret")
        })?;

        let hashed_secret = self.hash_on_blocking_pool(&secret).await?;

        let client = self
            .store
            .create_client(CreateClientParams {
                name: name.to_owned(),
                website: website.to_owned(),
                scope: scope.to_owned(),
                hashed_secret,
            })
            .await
            .map_err(|e| {
                error!(name, "error creating client: {e}");
                AppError::internal("failed to create client")
            })?;

        info!(name, client_id = client.id, "client registered successfully");
        Ok(RegisteredClient {
            client_id: client.id,
            client_secret: secret,
        })
    }

    /// Look up the existing authorization code for (client, user)
    ///
    /// A lookup, not an issuance: the user must have previously consented.
    /// No freshness check is performed on the stored code.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for bad client credentials, unknown user, or
    /// missing authorization; `Internal` for component failures.
    pub async fn get_authorization_code(
        &self,
        client_id: i64,
        client_secret: &str,
        username: &str,
    ) -> AppResult<String> {
        info!(client_id, username, "authorization code lookup received");

        self.authenticate_client(client_id, client_secret).await?;

        let user = self
            .store
            .get_user_by_username(username)
            .await
            .map_err(|e| match e {
                DatabaseError::UserNotFound => {
                    warn!(client_id, username, "code lookup rejected: unknown username");
                    AppError::unauthenticated(MSG_INVALID_USERNAME)
                }
                other => {
                    error!(username, "error fetching user by username: {other}");
                    AppError::internal("failed to fetch user")
                }
            })?;

        let authorization = self
            .store
            .get_authorization_by_user_and_client(user.id, client_id)
            .await
            .map_err(|e| match e {
                DatabaseError::AuthorizationNotFound => {
                    warn!(client_id, username, "code lookup rejected: no authorization");
                    AppError::unauthenticated(MSG_AUTHORIZATION_NOT_FOUND)
                }
                other => {
                    error!(client_id, "error fetching authorization: {other}");
                    AppError::internal("failed to fetch authorization")
                }
            })?;

        info!(client_id, username, "authorization code returned");
        Ok(authorization.auth_code)
    }

    /// Exchange an authorization code for an access/refresh token pair
    ///
    /// The bind check rejects a client spending another client's code. The
    /// authorization row is not consumed by the exchange in this version.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for bad client credentials, unknown code, or
    /// a code bound to a different client; `Internal` for component failures.
    pub async fn exchange_token(
        &self,
        client_id: i64,
        client_secret: &str,
        authorization_code: &str,
    ) -> AppResult<TokenPair> {
        info!(client_id, "token exchange request received");

        self.authenticate_client(client_id, client_secret).await?;

        let authorization = self
            .store
            .get_authorization_by_auth_code(authorization_code)
            .await
            .map_err(|e| match e {
                DatabaseError::AuthorizationNotFound => {
                    warn!(client_id, "exchange rejected: unknown auth code");
                    AppError::unauthenticated(MSG_INVALID_AUTH_CODE)
                }
                other => {
                    error!(client_id, "error fetching authorization by code: {other}");
                    AppError::internal("failed to fetch authorization")
                }
            })?;

        if authorization.client_id != client_id {
            warn!(
                client_id,
                code_client_id = authorization.client_id,
                "exchange rejected: code bound to a different client"
            );
            return Err(AppError::unauthenticated(MSG_INVALID_AUTHORIZATION_CODE));
        }

        let access_token = self
            .codec
            .generate(authorization.user_id, TokenType::Access)
            .map_err(|e| {
                error!(client_id, "error generating access token: {e}");
                AppError::internal("failed to generate access token")
            })?;

        let refresh_token = self
            .codec
            .generate(authorization.user_id, TokenType::Refresh)
            .map_err(|e| {
                error!(client_id, "error generating refresh token: {e}");
                AppError::internal("failed to generate refresh token")
            })?;

        info!(client_id, user_id = authorization.user_id, "tokens issued");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mint a fresh access token from a valid refresh token
    ///
    /// Refresh tokens are not rotated; the presented token stays valid until
    /// its own expiry.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for an invalid or expired refresh token,
    /// `Internal` for signature verification or minting failures.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<String> {
        info!("token refresh request received");

        let claims = self.codec.validate(refresh_token).map_err(|e| match e {
            TokenError::InvalidToken => {
                warn!("refresh rejected: invalid refresh token");
                AppError::unauthenticated(MSG_INVALID_REFRESH_TOKEN)
            }
            other => {
                error!("error validating refresh token: {other}");
                AppError::internal("failed to validate refresh token")
            }
        })?;

        let access_token = self
            .codec
            .generate(claims.subject, TokenType::Access)
            .map_err(|e| {
                error!(subject = claims.subject, "error generating access token: {e}");
                AppError::internal("failed to generate access token")
            })?;

        info!(subject = claims.subject, "access token refreshed");
        Ok(access_token)
    }

    /// Fetch the client and verify its secret, with one uniform failure
    /// message for both steps
    async fn authenticate_client(&self, client_id: i64, client_secret: &str) -> AppResult<Client> {
        let client = self
            .store
            .get_client_by_id(client_id)
            .await
            .map_err(|e| match e {
                DatabaseError::ClientNotFound => {
                    warn!(client_id, "client auth rejected: unknown client id");
                    AppError::unauthenticated(MSG_INVALID_CLIENT)
                }
                other => {
                    error!(client_id, "error fetching client: {other}");
                    AppError::internal("failed to fetch client")
                }
            })?;

        let hasher = self.hasher;
        let hashed = client.hashed_secret.clone();
        let secret = client_secret.to_owned();

        let outcome = tokio::task::spawn_blocking(move || hasher.verify(&hashed, &secret))
            .await
            .map_err(|e| {
                error!(client_id, "secret verify task failed to join: {e}");
                AppError::internal("verify task failed")
            })?;

        match outcome {
            Ok(()) => Ok(client),
            Err(PasswordError::Mismatch) => {
                warn!(client_id, "client auth rejected: wrong secret");
                Err(AppError::unauthenticated(MSG_INVALID_CLIENT))
            }
            Err(PasswordError::Hash(e)) => {
                error!(client_id, "error comparing client secret: {e}");
                Err(AppError::internal("failed to verify client secret"))
            }
        }
    }

    async fn hash_on_blocking_pool(&self, plaintext: &str) -> AppResult<String> {
        let hasher = self.hasher;
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| {
                error!("secret hashing task failed to join: {e}");
                AppError::internal("hashing task failed")
            })?
            .map_err(|e| {
                error!("error hashing client secret: {e}");
                AppError::internal("failed to hash client secret")
            })
    }
}

/// Generate a base64-URL-encoded client secret from 32 CSPRNG bytes
fn generate_client_secret() -> Result<String, ring::error::Unspecified> {
    let rng = SystemRandom::new();
    let mut secret = [0u8; CLIENT_SECRET_LEN];
    rng.fill(&mut secret)?;
    Ok(general_purpose::URL_SAFE.encode(secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_secrets_are_long_and_unique() {
        let a = generate_client_secret().unwrap();
        let b = generate_client_secret().unwrap();

        // 32 bytes -> 44 padded base64url characters
        assert_eq!(a.len(), 44);
        assert_ne!(a, b);
    }
}
