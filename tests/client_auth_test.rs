// ABOUTME: Integration tests for the client-facing auth service
// ABOUTME: Registration secret handling, code lookup, exchange bind check, and refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use chrono::Duration;
use grantor::config::JwtConfig;
use grantor::crypto::PasswordHasher;
use grantor::database::{CreateAuthorizationParams, CreateUserParams, DataStore, Database};
use grantor::errors::ErrorCode;
use grantor::services::ClientAuthService;
use grantor::tokens::{TokenCodec, TokenType};
use jsonwebtoken::Algorithm;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "verysecretKey".to_owned(),
        issuer: "oauth".to_owned(),
        audience: "users".to_owned(),
        algorithm: Algorithm::HS256,
        access_token_ttl: Duration::seconds(3600),
        refresh_token_ttl: Duration::seconds(7200),
        header_name: "Authorization".to_owned(),
        header_prefix: "Bearer".to_owned(),
    }
}

fn service_over(store: &Database) -> (ClientAuthService, TokenCodec) {
    let codec = TokenCodec::new(&jwt_config());
    (
        ClientAuthService::new(store.clone(), PasswordHasher::new(), codec.clone()),
        codec,
    )
}

async fn seed_user(store: &Database, username: &str, email: &str) -> i64 {
    store
        .create_user(CreateUserParams {
            username: username.to_owned(),
            hashed_password: "$2b$10$fakehashfakehashfakehash".to_owned(),
            email: email.to_owned(),
        })
        .await
        .unwrap()
        .id
}

async fn seed_grant(store: &Database, user_id: i64, client_id: i64) -> String {
    store
        .create_authorization(CreateAuthorizationParams {
            user_id,
            client_id,
            scope: String::new(),
        })
        .await
        .unwrap()
        .auth_code
}

#[tokio::test]
async fn registration_returns_the_secret_exactly_once() {
    let store = Database::memory();
    let (service, _) = service_over(&store);

    let registered = service
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();

    // The stored hash is not the secret, but verifies against it.
    let client = store.get_client_by_id(registered.client_id).await.unwrap();
    assert_ne!(client.hashed_secret, registered.client_secret);
    PasswordHasher::new()
        .verify(&client.hashed_secret, &registered.client_secret)
        .unwrap();

    // No other surface returns the plaintext again.
    assert_eq!(client.scope, "admin");
    assert_eq!(client.name, "app1234");
}

#[tokio::test]
async fn reregistering_the_same_name_is_internal() {
    let store = Database::memory();
    let (service, _) = service_over(&store);

    service
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();
    let err = service
        .register_client("app1234", "https://b.test", "admin")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Internal);
}

#[tokio::test]
async fn code_lookup_returns_the_granted_code() {
    let store = Database::memory();
    let (service, _) = service_over(&store);

    let user_id = seed_user(&store, "alice", "alice@x.com").await;
    let registered = service
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();
    let code = seed_grant(&store, user_id, registered.client_id).await;

    let found = service
        .get_authorization_code(registered.client_id, &registered.client_secret, "alice")
        .await
        .unwrap();
    assert_eq!(found, code);
}

#[tokio::test]
async fn code_lookup_rejects_wrong_secret_and_unknown_client_identically() {
    let store = Database::memory();
    let (service, _) = service_over(&store);

    let user_id = seed_user(&store, "alice", "alice@x.com").await;
    let registered = service
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();
    seed_grant(&store, user_id, registered.client_id).await;

    let wrong_secret = service
        .get_authorization_code(registered.client_id, "wrong-secret-12", "alice")
        .await
        .unwrap_err();
    let unknown_client = service
        .get_authorization_code(9999, "wrong-secret-12", "alice")
        .await
        .unwrap_err();

    assert_eq!(wrong_secret.code, ErrorCode::Unauthenticated);
    assert_eq!(unknown_client.code, ErrorCode::Unauthenticated);
    assert_eq!(wrong_secret.message, unknown_client.message);
}

#[tokio::test]
async fn code_lookup_without_prior_consent_is_unauthenticated() {
    let store = Database::memory();
    let (service, _) = service_over(&store);

    seed_user(&store, "alice", "alice@x.com").await;
    let registered = service
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();

    let err = service
        .get_authorization_code(registered.client_id, &registered.client_secret, "alice")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthenticated);
}

#[tokio::test]
async fn exchange_mints_tokens_for_the_granting_user() {
    let store = Database::memory();
    let (service, codec) = service_over(&store);

    let user_id = seed_user(&store, "alice", "alice@x.com").await;
    let registered = service
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();
    let code = seed_grant(&store, user_id, registered.client_id).await;

    let pair = service
        .exchange_token(registered.client_id, &registered.client_secret, &code)
        .await
        .unwrap();

    // Bind invariant: both tokens carry the granting user's id as subject.
    assert_eq!(codec.validate(&pair.access_token).unwrap().subject, user_id);
    assert_eq!(codec.validate(&pair.refresh_token).unwrap().subject, user_id);
}

#[tokio::test]
async fn exchange_rejects_another_clients_code() {
    let store = Database::memory();
    let (service, _) = service_over(&store);

    let user_id = seed_user(&store, "alice", "alice@x.com").await;
    let client_a = service
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();
    let client_b = service
        .register_client("app5678", "https://b.test", "admin")
        .await
        .unwrap();
    let code_for_a = seed_grant(&store, user_id, client_a.client_id).await;

    let err = service
        .exchange_token(client_b.client_id, &client_b.client_secret, &code_for_a)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthenticated);
}

#[tokio::test]
async fn exchange_with_unknown_code_is_unauthenticated() {
    let store = Database::memory();
    let (service, _) = service_over(&store);

    let registered = service
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();

    let err = service
        .exchange_token(
            registered.client_id,
            &registered.client_secret,
            "no-such-code",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthenticated);
}

#[tokio::test]
async fn refresh_mints_a_new_access_token_for_the_same_subject() {
    let store = Database::memory();
    let (service, codec) = service_over(&store);

    let refresh = codec.generate(42, TokenType::Refresh).unwrap();
    let access = service.refresh_token(&refresh).await.unwrap();

    assert_eq!(codec.validate(&access).unwrap().subject, 42);
}

#[tokio::test]
async fn refresh_with_an_expired_token_is_unauthenticated() {
    let store = Database::memory();
    let mut config = jwt_config();
    config.refresh_token_ttl = Duration::seconds(1);
    let codec = TokenCodec::new(&config);
    let service = ClientAuthService::new(store, PasswordHasher::new(), codec.clone());

    let refresh = codec.generate(42, TokenType::Refresh).unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let err = service.refresh_token(&refresh).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthenticated);
}
