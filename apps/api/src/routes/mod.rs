pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::sessions::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/auth/signup", post(auth::handle_signup))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/logout", get(auth::handle_logout))
        .route("/api/auth/me", get(auth::handle_me))
        // Sessions API
        .route(
            "/api/sessions",
            post(sessions::handle_create_session).get(sessions::handle_list_sessions),
        )
        .route(
            "/api/sessions/:id",
            get(sessions::handle_get_session)
                .put(sessions::handle_update_session)
                .delete(sessions::handle_delete_session),
        )
        .route(
            "/api/sessions/:session_id/questions/:question_id/details",
            get(sessions::handle_question_details),
        )
        .route(
            "/api/sessions/:session_id/generate-questions",
            post(sessions::handle_generate_questions),
        )
        .with_state(state)
}
