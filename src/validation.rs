// ABOUTME: Syntactic request validation run before every RPC dispatch
// ABOUTME: Field length and shape rules; violations become InvalidArgument with a per-field message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use crate::errors::{AppError, AppResult};

/// Validate a `RegisterUser` request
///
/// # Errors
///
/// Returns `InvalidArgument` naming the offending field.
pub fn validate_register_user(username: &str, password: &str, email: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::invalid_argument("email must be a valid address"));
    }
    check_length("username", username, 4, Some(20))?;
    check_length("password", password, 8, None)
}

/// Validate a `LoginUser` request
///
/// # Errors
///
/// Returns `InvalidArgument` naming the offending field.
pub fn validate_login_user(username: &str, password: &str) -> AppResult<()> {
    check_length("username", username, 3, Some(20))?;
    check_length("password", password, 8, None)
}

/// Validate a `ConsentUser` request
///
/// # Errors
///
/// Returns `InvalidArgument` naming the offending field.
pub fn validate_consent_user(client_id: i64, session_id: &str) -> AppResult<()> {
    check_client_id(client_id)?;
    check_length("session_id", session_id, 4, None)
}

/// Validate a `LogoutUser` request
///
/// # Errors
///
/// Returns `InvalidArgument` naming the offending field.
pub fn validate_logout_user(session_id: &str) -> AppResult<()> {
    check_length("session_id", session_id, 4, None)
}

/// Validate a `RegisterClient` request
///
/// # Errors
///
/// Returns `InvalidArgument` naming the offending field.
pub fn validate_register_client(name: &str, website: &str, scope: &str) -> AppResult<()> {
    check_length("name", name, 4, None)?;
    check_length("website", website, 5, None)?;
    check_length("scope", scope, 4, None)
}

/// Validate a `GetAuthorizationCode` request
///
/// # Errors
///
/// Returns `InvalidArgument` naming the offending field.
pub fn validate_get_authorization_code(
    client_id: i64,
    client_secret: &str,
    username: &str,
) -> AppResult<()> {
    check_client_id(client_id)?;
    check_length("client_secret", client_secret, 8, None)?;
    check_length("username", username, 4, Some(20))
}

/// Validate an `ExchangeToken` request
///
/// # Errors
///
/// Returns `InvalidArgument` naming the offending field.
pub fn validate_exchange_token(
    client_id: i64,
    client_secret: &str,
    authorization_code: &str,
) -> AppResult<()> {
    check_client_id(client_id)?;
    check_length("client_secret", client_secret, 8, None)?;
    check_length("authorization_code", authorization_code, 8, None)
}

/// Validate a `RefreshToken` request
///
/// # Errors
///
/// Returns `InvalidArgument` if the token is not a JWT-shaped string.
pub fn validate_refresh_token(refresh_token: &str) -> AppResult<()> {
    if jsonwebtoken::decode_header(refresh_token).is_err() {
        return Err(AppError::invalid_argument(
            "refresh_token must be a well-formed JWT",
        ));
    }
    Ok(())
}

fn check_length(field: &str, value: &str, min: usize, max: Option<usize>) -> AppResult<()> {
    if value.len() < min {
        return Err(AppError::invalid_argument(format!(
            "{field} must be at least {min} characters"
        )));
    }
    if let Some(max) = max {
        if value.len() > max {
            return Err(AppError::invalid_argument(format!(
                "{field} must be at most {max} characters"
            )));
        }
    }
    Ok(())
}

fn check_client_id(client_id: i64) -> AppResult<()> {
    if client_id < 4 {
        return Err(AppError::invalid_argument("client_id must be at least 4"));
    }
    Ok(())
}

/// Structural email validation: one `@`, non-empty local part, dotted domain,
/// no whitespace
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some(at_pos) = email.find('@') else {
        return false;
    };
    if at_pos == 0 || at_pos == email.len() - 1 {
        return false;
    }
    let domain = &email[at_pos + 1..];
    if domain.contains('@') {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_register_user() {
        validate_register_user("alice", "correctpw1", "alice@x.com").unwrap();
    }

    #[test]
    fn rejects_short_username() {
        assert!(validate_register_user("al", "correctpw1", "alice@x.com").is_err());
    }

    #[test]
    fn rejects_overlong_username() {
        let name = "a".repeat(21);
        assert!(validate_register_user(&name, "correctpw1", "alice@x.com").is_err());
    }

    #[test]
    fn rejects_short_password() {
        assert!(validate_register_user("alice", "short", "alice@x.com").is_err());
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "alice", "@x.com", "alice@", "alice@x", "a b@x.com", "a@b@x.com", "alice@.com"] {
            assert!(
                validate_register_user("alice", "correctpw1", email).is_err(),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn login_allows_three_character_usernames() {
        validate_login_user("bob", "correctpw1").unwrap();
        assert!(validate_login_user("bo", "correctpw1").is_err());
    }

    #[test]
    fn consent_checks_client_id_and_session_id() {
        validate_consent_user(4, "sess").unwrap();
        assert!(validate_consent_user(3, "sess").is_err());
        assert!(validate_consent_user(4, "abc").is_err());
    }

    #[test]
    fn register_client_checks_each_field() {
        validate_register_client("app1234", "https://a.test", "admin").unwrap();
        assert!(validate_register_client("app", "https://a.test", "admin").is_err());
        assert!(validate_register_client("app1234", "http", "admin").is_err());
        assert!(validate_register_client("app1234", "https://a.test", "adm").is_err());
    }

    #[test]
    fn refresh_token_must_be_jwt_shaped() {
        assert!(validate_refresh_token("malformed").is_err());
        assert!(validate_refresh_token("").is_err());

        // A structurally valid JWT passes shape validation regardless of its
        // signature; authenticity is the codec's job.
        let header = "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9";
        let token = format!("{header}.eyJzdWIiOjF9.c2ln");
        validate_refresh_token(&token).unwrap();
    }
}
