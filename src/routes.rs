// ABOUTME: HTTP rendering of the eight-RPC surface plus a health endpoint
// ABOUTME: Thin axum handlers: validate the request, delegate to a service, wrap the response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantor Authors

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;
use crate::services::ServerResources;
use crate::validation;

/// Build the full request router over shared server resources
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/users/register", post(register_user))
        .route("/api/users/login", post(login_user))
        .route("/api/users/logout", post(logout_user))
        .route("/api/users/consent", post(consent_user))
        .route("/api/clients/register", post(register_client))
        .route("/api/clients/authorization-code", post(get_authorization_code))
        .route("/api/clients/token", post(exchange_token))
        .route("/api/clients/token/refresh", post(refresh_token))
        .with_state(resources)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterUserResponse {}

async fn register_user(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<RegisterUserRequest>,
) -> AppResult<Json<RegisterUserResponse>> {
    validation::validate_register_user(&request.username, &request.password, &request.email)?;
    resources
        .user_auth
        .register(&request.username, &request.password, &request.email)
        .await?;
    Ok(Json(RegisterUserResponse {}))
}

#[derive(Debug, Deserialize)]
pub struct LoginUserRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUserResponse {
    pub session_id: String,
}

async fn login_user(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<LoginUserRequest>,
) -> AppResult<Json<LoginUserResponse>> {
    validation::validate_login_user(&request.username, &request.password)?;
    let session_id = resources
        .user_auth
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(LoginUserResponse { session_id }))
}

#[derive(Debug, Deserialize)]
pub struct LogoutUserRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutUserResponse {}

async fn logout_user(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<LogoutUserRequest>,
) -> AppResult<Json<LogoutUserResponse>> {
    validation::validate_logout_user(&request.session_id)?;
    resources.user_auth.logout(&request.session_id).await?;
    Ok(Json(LogoutUserResponse {}))
}

#[derive(Debug, Deserialize)]
pub struct ConsentUserRequest {
    pub session_id: String,
    pub client_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ConsentUserResponse {}

async fn consent_user(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<ConsentUserRequest>,
) -> AppResult<Json<ConsentUserResponse>> {
    validation::validate_consent_user(request.client_id, &request.session_id)?;
    resources
        .user_auth
        .consent(&request.session_id, request.client_id)
        .await?;
    Ok(Json(ConsentUserResponse {}))
}

#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    pub name: String,
    pub website: String,
    pub scope: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterClientResponse {
    pub client_id: i64,
    /// Returned exactly once; never retrievable again
    pub client_secret: String,
}

async fn register_client(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<RegisterClientRequest>,
) -> AppResult<Json<RegisterClientResponse>> {
    validation::validate_register_client(&request.name, &request.website, &request.scope)?;
    let registered = resources
        .client_auth
        .register_client(&request.name, &request.website, &request.scope)
        .await?;
    Ok(Json(RegisterClientResponse {
        client_id: registered.client_id,
        client_secret: registered.client_secret,
    }))
}

#[derive(Debug, Deserialize)]
pub struct GetAuthorizationCodeRequest {
    pub client_id: i64,
    pub client_secret: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct GetAuthorizationCodeResponse {
    pub authorization_code: String,
}

async fn get_authorization_code(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<GetAuthorizationCodeRequest>,
) -> AppResult<Json<GetAuthorizationCodeResponse>> {
    validation::validate_get_authorization_code(
        request.client_id,
        &request.client_secret,
        &request.username,
    )?;
    let authorization_code = resources
        .client_auth
        .get_authorization_code(request.client_id, &request.client_secret, &request.username)
        .await?;
    Ok(Json(GetAuthorizationCodeResponse { authorization_code }))
}

#[derive(Debug, Deserialize)]
pub struct ExchangeTokenRequest {
    pub client_id: i64,
    pub client_secret: String,
    pub authorization_code: String,
}

#[derive(Debug, Serialize)]
pub struct ExchangeTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

async fn exchange_token(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<ExchangeTokenRequest>,
) -> AppResult<Json<ExchangeTokenResponse>> {
    validation::validate_exchange_token(
        request.client_id,
        &request.client_secret,
        &request.authorization_code,
    )?;
    let pair = resources
        .client_auth
        .exchange_token(
            request.client_id,
            &request.client_secret,
            &request.authorization_code,
        )
        .await?;
    Ok(Json(ExchangeTokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

async fn refresh_token(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<RefreshTokenRequest>,
) -> AppResult<Json<RefreshTokenResponse>> {
    validation::validate_refresh_token(&request.refresh_token)?;
    let access_token = resources
        .client_auth
        .refresh_token(&request.refresh_token)
        .await?;
    Ok(Json(RefreshTokenResponse { access_token }))
}
