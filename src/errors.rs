// ABOUTME: Centralized error handling and wire status mapping for the authorization server
// ABOUTME: Defines the three client-visible status codes and the AppError HTTP response shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

//! # Unified Error Handling
//!
//! Component errors ([`crate::database::DatabaseError`], [`crate::tokens::TokenError`],
//! [`crate::session::SessionError`], [`crate::crypto::PasswordError`]) are typed and
//! stay inside the crate; services translate them into [`AppError`] at the RPC
//! boundary. Only the sanitized message ever reaches a client.

use std::fmt::{self, Display};

use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::warn;

/// Client-visible status codes for the RPC surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    /// Request failed syntactic validation
    InvalidArgument,
    /// Credentials were missing, wrong, or expired
    Unauthenticated,
    /// Store, hash, or codec failure the client cannot act on
    Internal,
}

impl ErrorCode {
    /// Get the `HTTP` status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::Unauthenticated => 401,
            Self::Internal => 500,
        }
    }

    /// Get a generic description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidArgument => "The provided input is invalid",
            Self::Unauthenticated => "The provided credentials are invalid",
            Self::Internal => "internal server error",
        }
    }
}

/// Application error carried from the service layer to the HTTP boundary
#[derive(Debug, Clone, ThisError)]
pub struct AppError {
    /// Wire status for this error
    pub code: ErrorCode,
    /// Human-readable message; must already be safe for the client unless the
    /// code is `Internal`
    pub message: String,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Validation failure with a per-field message
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Credential failure; the message must not reveal which credential failed
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    /// Internal failure; the message is for logs, never for the client
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Get the `HTTP` status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Get the message safe for client exposure
    ///
    /// Validation and credential messages are constructed generic at the call
    /// site and pass through; internal detail is replaced wholesale.
    #[must_use]
    pub fn sanitized_message(&self) -> String {
        match self.code {
            ErrorCode::InvalidArgument | ErrorCode::Unauthenticated => self.message.clone(),
            ErrorCode::Internal => self.code.description().to_owned(),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Wire error body returned for every non-OK status
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Status code identifying the class of error
    pub code: ErrorCode,
    /// Sanitized message
    pub message: String,
    /// RFC3339 timestamp when the error occurred
    pub timestamp: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        // Full detail goes to the log; the client gets the sanitized form.
        warn!("request failed: {error}");

        Self {
            code: error.code,
            message: error.sanitized_message(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use axum::http::StatusCode;
        use axum::Json;

        let status = StatusCode::from_u16(self.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

/// Result type alias for service and handler code
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_detail_never_reaches_the_client() {
        let err = AppError::internal("pool timed out talking to pg");
        assert_eq!(err.sanitized_message(), "internal server error");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn credential_messages_pass_through() {
        let err = AppError::unauthenticated("invalid username or password");
        assert_eq!(err.sanitized_message(), "invalid username or password");
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn validation_messages_pass_through() {
        let err = AppError::invalid_argument("username must be 4-20 characters");
        assert_eq!(err.sanitized_message(), "username must be 4-20 characters");
        assert_eq!(err.http_status(), 400);
    }
}
