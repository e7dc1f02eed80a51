// ABOUTME: Integration tests for the signed bearer token codec
// ABOUTME: Round-trip claims, TTL selection, expiry, and tamper rejection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use chrono::{Duration, Utc};
use grantor::config::JwtConfig;
use grantor::tokens::{TokenCodec, TokenError, TokenType};
use jsonwebtoken::Algorithm;

fn test_config(access_secs: i64, refresh_secs: i64) -> JwtConfig {
    JwtConfig {
        secret: "verysecretKey".to_owned(),
        issuer: "oauth".to_owned(),
        audience: "users".to_owned(),
        algorithm: Algorithm::HS256,
        access_token_ttl: Duration::seconds(access_secs),
        refresh_token_ttl: Duration::seconds(refresh_secs),
        header_name: "Authorization".to_owned(),
        header_prefix: "Bearer".to_owned(),
    }
}

#[test]
fn round_trip_preserves_subject_and_expiry() {
    let codec = TokenCodec::new(&test_config(3600, 7200));

    for (subject, token_type, ttl) in [
        (1_i64, TokenType::Access, 3600_i64),
        (42, TokenType::Refresh, 7200),
        (i64::MAX, TokenType::Access, 3600),
    ] {
        let token = codec.generate(subject, token_type).unwrap();
        let claims = codec.validate(&token).unwrap();

        assert_eq!(claims.subject, subject);

        // Expiry lands within one second of configured-TTL-from-now.
        let expected = Utc::now() + Duration::seconds(ttl);
        let drift = (claims.expires_at - expected).num_seconds().abs();
        assert!(drift <= 1, "expiry drifted by {drift}s");
    }
}

#[test]
fn access_and_refresh_tokens_get_distinct_lifetimes() {
    let codec = TokenCodec::new(&test_config(60, 600));

    let access = codec.validate(&codec.generate(7, TokenType::Access).unwrap()).unwrap();
    let refresh = codec.validate(&codec.generate(7, TokenType::Refresh).unwrap()).unwrap();

    let gap = (refresh.expires_at - access.expires_at).num_seconds();
    assert!((539..=541).contains(&gap), "lifetime gap was {gap}s");
}

#[test]
fn expired_token_is_invalid_not_a_validation_error() {
    let codec = TokenCodec::new(&test_config(1, 1));
    let token = codec.generate(7, TokenType::Access).unwrap();

    std::thread::sleep(std::time::Duration::from_secs(2));

    assert!(matches!(codec.validate(&token), Err(TokenError::InvalidToken)));
}

#[test]
fn tampered_payload_fails_signature_verification() {
    let codec = TokenCodec::new(&test_config(3600, 7200));
    let token = codec.generate(7, TokenType::Access).unwrap();

    // Flip the subject inside the payload segment; the signature no longer
    // covers the new bytes.
    let mut parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3);
    let forged_payload = "eyJzdWIiOjk5OSwiaXNzIjoib2F1dGgiLCJpYXQiOjAsImV4cCI6OTk5OTk5OTk5OX0";
    parts[1] = forged_payload;
    let forged = parts.join(".");

    assert!(matches!(codec.validate(&forged), Err(TokenError::Validate(_))));
}

#[test]
fn invalidate_is_a_noop_by_contract() {
    let codec = TokenCodec::new(&test_config(3600, 7200));
    let token = codec.generate(7, TokenType::Access).unwrap();

    codec.invalidate(&token);

    // No blacklist exists; a later validate is not required to fail.
    assert!(codec.validate(&token).is_ok());
}
