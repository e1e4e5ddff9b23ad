//! Axum route handlers for the Auth API.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::extractor::{presented_token, TOKEN_COOKIE};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{issue_token, revoke_token, IssuedToken};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::JsonBody;
use crate::models::user::{NewUser, User};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let full_name = req.full_name.trim().to_string();
    let email = normalize_email(&req.email);

    if full_name.is_empty() {
        return Err(AppError::Validation("Please tell us your name".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("Please provide a valid email".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let user = state
        .store
        .create_user(NewUser {
            full_name,
            email,
            password_hash: hash_password(&req.password)?,
        })
        .await?;

    let issued = issue_token(state.store.as_ref(), user.id, state.config.auth_token_ttl_days).await?;
    info!("Registered user {}", user.id);

    Ok(token_response(StatusCode::CREATED, &user, &issued))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Please provide email and password".to_string(),
        ));
    }

    let incorrect = || AppError::Unauthorized("Incorrect email or password".to_string());

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(incorrect)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(incorrect());
    }

    let issued = issue_token(state.store.as_ref(), user.id, state.config.auth_token_ttl_days).await?;
    info!("User {} logged in", user.id);

    Ok(token_response(StatusCode::OK, &user, &issued))
}

/// GET /api/auth/logout
///
/// Revokes the presented token, if any, and clears the cookie. Never fails for a missing token.
pub async fn handle_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = presented_token(&headers) {
        revoke_token(state.store.as_ref(), &token).await?;
    }

    let cookie = format!("{TOKEN_COOKIE}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "status": "success",
            "message": "Logged out successfully"
        })),
    ))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store
        .find_user_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("The user for this token no longer exists".to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "data": { "user": user }
    })))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn token_response(status: StatusCode, user: &User, issued: &IssuedToken) -> impl IntoResponse {
    let max_age = (issued.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = format!(
        "{TOKEN_COOKIE}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={max_age}",
        issued.token
    );

    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "status": "success",
            "token": issued.token,
            "data": { "user": user }
        })),
    )
}
