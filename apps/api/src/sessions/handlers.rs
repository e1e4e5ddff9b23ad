//! Axum route handlers for the Sessions API.
//!
//! Every route requires `AuthUser`. Sessions owned by another user and malformed ids both
//! answer 404, exactly like sessions that do not exist.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::JsonBody;
use crate::models::session::SessionPatch;
use crate::sessions::workflow::{
    create_session, generate_more_questions, question_details, validate_patch, SessionInput,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub description: Option<String>,
}

fn parse_id(raw: &str, not_found: fn() -> AppError) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(req): JsonBody<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = SessionInput::new(&req.title, &req.skills, &req.experience, &req.description)?;
    let session = create_session(state.store.as_ref(), state.llm.as_ref(), user.id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "session": session }
        })),
    ))
}

/// GET /api/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.store.list_sessions(user.id).await?;

    Ok(Json(json!({
        "status": "success",
        "results": sessions.len(),
        "data": { "sessions": sessions }
    })))
}

/// GET /api/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = parse_id(&id, AppError::session_not_found)?;
    let session = state
        .store
        .find_session(session_id, user.id)
        .await?
        .ok_or_else(AppError::session_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "data": { "session": session }
    })))
}

/// PUT /api/sessions/:id
///
/// Partial update of title/skills/experience/description. Questions are not regenerated.
pub async fn handle_update_session(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = parse_id(&id, AppError::session_not_found)?;
    let patch = validate_patch(SessionPatch {
        title: req.title,
        skills: req.skills,
        experience: req.experience,
        description: req.description,
    })?;

    let session = state
        .store
        .update_session(session_id, user.id, patch)
        .await?
        .ok_or_else(AppError::session_not_found)?;

    Ok(Json(json!({
        "status": "success",
        "data": { "session": session }
    })))
}

/// DELETE /api/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let session_id = parse_id(&id, AppError::session_not_found)?;
    if !state.store.delete_session(session_id, user.id).await? {
        return Err(AppError::session_not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:session_id/questions/:question_id/details
pub async fn handle_question_details(
    State(state): State<AppState>,
    user: AuthUser,
    Path((session_id, question_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = parse_id(&session_id, AppError::session_not_found)?;
    let question_id = parse_id(&question_id, AppError::question_not_found)?;

    let explanation = question_details(
        state.store.as_ref(),
        state.llm.as_ref(),
        session_id,
        question_id,
        user.id,
    )
    .await?;

    Ok(Json(json!({
        "status": "success",
        "data": explanation
    })))
}

/// POST /api/sessions/:session_id/generate-questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = parse_id(&session_id, AppError::session_not_found)?;
    let questions =
        generate_more_questions(state.store.as_ref(), state.llm.as_ref(), session_id, user.id)
            .await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "questions": questions }
    })))
}
