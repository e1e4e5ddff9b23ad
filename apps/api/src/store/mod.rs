//! Record Store — persistence boundary for users, auth tokens, sessions and questions.
//!
//! `AppState` holds an `Arc<dyn RecordStore>`. Production uses `PgStore`; the test suite
//! uses the in-memory store in `memory.rs`.
//!
//! Every session-scoped read or write takes the requesting user's id. A session owned by
//! someone else is indistinguishable from a missing one (`Ok(None)` / `Ok(false)`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{
    NewQuestion, NewSession, PopulatedSession, QuestionRow, SessionPatch, SessionRow,
};
use crate::models::user::{NewUser, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    // --- Users ---

    /// Fails with `AppError::Validation` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    // --- Auth tokens (stored as digests only) ---

    async fn insert_auth_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Resolves a token digest to its user id if the token has not expired at `now`.
    async fn find_token_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError>;

    async fn delete_auth_token(&self, token_hash: &str) -> Result<(), AppError>;

    // --- Sessions ---

    async fn create_session(&self, session: NewSession) -> Result<SessionRow, AppError>;

    /// All sessions of a user, newest first, questions populated.
    async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<PopulatedSession>, AppError>;

    async fn find_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<PopulatedSession>, AppError>;

    /// Applies the patch and bumps `updated_at`. Questions are untouched.
    async fn update_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        patch: SessionPatch,
    ) -> Result<Option<PopulatedSession>, AppError>;

    /// Removes the session and all of its questions as one unit.
    async fn delete_session(&self, session_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    // --- Questions ---

    /// Appends questions to an owned session and bumps its `updated_at` as one unit.
    /// Returns `Ok(None)` when the session does not exist or belongs to someone else.
    async fn append_questions(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        questions: Vec<NewQuestion>,
    ) -> Result<Option<Vec<QuestionRow>>, AppError>;

    /// A question matching all three of id, session and owner.
    async fn find_question(
        &self,
        question_id: Uuid,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<QuestionRow>, AppError>;
}
