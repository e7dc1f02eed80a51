// ABOUTME: End-to-end authorization-code grant scenarios across both services
// ABOUTME: Register, login, consent, code lookup, exchange, and refresh with literal values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use chrono::Duration;
use grantor::config::JwtConfig;
use grantor::crypto::PasswordHasher;
use grantor::database::{DataStore, Database};
use grantor::errors::ErrorCode;
use grantor::services::{ClientAuthService, UserAuthService};
use grantor::session::SessionManager;
use grantor::tokens::TokenCodec;
use jsonwebtoken::Algorithm;

struct TestServer {
    store: Database,
    user_auth: UserAuthService,
    client_auth: ClientAuthService,
    codec: TokenCodec,
}

fn test_server(access_ttl_secs: i64) -> TestServer {
    let store = Database::memory();
    let hasher = PasswordHasher::new();
    let sessions = SessionManager::new(store.clone(), Duration::hours(1));
    let codec = TokenCodec::new(&JwtConfig {
        secret: "verysecretKey".to_owned(),
        issuer: "oauth".to_owned(),
        audience: "users".to_owned(),
        algorithm: Algorithm::HS256,
        access_token_ttl: Duration::seconds(access_ttl_secs),
        refresh_token_ttl: Duration::seconds(7200),
        header_name: "Authorization".to_owned(),
        header_prefix: "Bearer".to_owned(),
    });

    TestServer {
        store: store.clone(),
        user_auth: UserAuthService::new(store.clone(), sessions, hasher),
        client_auth: ClientAuthService::new(store, hasher, codec.clone()),
        codec,
    }
}

#[tokio::test]
async fn full_authorization_code_grant_flow() {
    let server = test_server(3600);

    // A user registers and signs in.
    server
        .user_auth
        .register("alice", "correctpw1", "alice@x.com")
        .await
        .unwrap();
    let session_id = server.user_auth.login("alice", "correctpw1").await.unwrap();

    let alice = server.store.get_user_by_username("alice").await.unwrap();
    let session = server.store.get_session_by_id(&session_id).await.unwrap();
    assert_eq!(session.user_id, alice.id);

    // A client registers and receives its secret exactly once.
    let client = server
        .client_auth
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();
    let rereg = server
        .client_auth
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap_err();
    assert_eq!(rereg.code, ErrorCode::Internal);

    // The user consents; an authorization row with a code now exists.
    server
        .user_auth
        .consent(&session_id, client.client_id)
        .await
        .unwrap();
    let grant = server
        .store
        .get_authorization_by_user_and_client(alice.id, client.client_id)
        .await
        .unwrap();
    assert_eq!(grant.user_id, alice.id);
    assert_eq!(grant.client_id, client.client_id);

    // The client looks up its code with its own credentials.
    let code = server
        .client_auth
        .get_authorization_code(client.client_id, &client.client_secret, "alice")
        .await
        .unwrap();
    assert_eq!(code, grant.auth_code);

    // A wrong secret is rejected without revealing which part failed.
    let bad_secret = server
        .client_auth
        .get_authorization_code(client.client_id, "wrong-secret-12", "alice")
        .await
        .unwrap_err();
    assert_eq!(bad_secret.code, ErrorCode::Unauthenticated);

    // The code is exchanged for tokens whose subject is the granting user.
    let pair = server
        .client_auth
        .exchange_token(client.client_id, &client.client_secret, &code)
        .await
        .unwrap();
    assert_eq!(
        server.codec.validate(&pair.access_token).unwrap().subject,
        alice.id
    );

    // Another client cannot spend the code, even with valid credentials.
    let other = server
        .client_auth
        .register_client("app5678", "https://b.test", "admin")
        .await
        .unwrap();
    let confused = server
        .client_auth
        .exchange_token(other.client_id, &other.client_secret, &code)
        .await
        .unwrap_err();
    assert_eq!(confused.code, ErrorCode::Unauthenticated);
}

#[tokio::test]
async fn expired_access_token_can_be_replaced_via_refresh() {
    let server = test_server(1);

    server
        .user_auth
        .register("alice", "correctpw1", "alice@x.com")
        .await
        .unwrap();
    let session_id = server.user_auth.login("alice", "correctpw1").await.unwrap();
    let alice = server.store.get_user_by_username("alice").await.unwrap();

    let client = server
        .client_auth
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();
    server
        .user_auth
        .consent(&session_id, client.client_id)
        .await
        .unwrap();
    let code = server
        .client_auth
        .get_authorization_code(client.client_id, &client.client_secret, "alice")
        .await
        .unwrap();
    let pair = server
        .client_auth
        .exchange_token(client.client_id, &client.client_secret, &code)
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    // The access token is now expired, the refresh token still valid.
    assert!(server.codec.validate(&pair.access_token).is_err());
    let fresh = server
        .client_auth
        .refresh_token(&pair.refresh_token)
        .await
        .unwrap();
    assert_eq!(server.codec.validate(&fresh).unwrap().subject, alice.id);
}

#[tokio::test]
async fn malformed_refresh_token_is_rejected_before_dispatch() {
    // The request validation layer runs ahead of the service and refuses
    // anything that is not JWT-shaped.
    let err = grantor::validation::validate_refresh_token("malformed").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn logged_out_session_cannot_consent() {
    let server = test_server(3600);

    server
        .user_auth
        .register("alice", "correctpw1", "alice@x.com")
        .await
        .unwrap();
    let session_id = server.user_auth.login("alice", "correctpw1").await.unwrap();
    let client = server
        .client_auth
        .register_client("app1234", "https://a.test", "admin")
        .await
        .unwrap();

    server.user_auth.logout(&session_id).await.unwrap();

    let err = server
        .user_auth
        .consent(&session_id, client.client_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthenticated);
}
