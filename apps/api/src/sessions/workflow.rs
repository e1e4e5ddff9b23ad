//! Session workflow — orchestrates the Record Store and the generators.
//!
//! Create flow: validate → persist session → generate initial batch → append questions
//! (one transaction with the session timestamp bump) → re-read populated session.
//!
//! Generation never fails here; only store errors propagate.

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::explanation::{explain_question, Explanation};
use crate::generation::questions::{generate_questions, Batch, QuestionRequest, QUESTIONS_PER_BATCH};
use crate::llm_client::TextGenerator;
use crate::models::session::{NewSession, PopulatedSession, QuestionRow, SessionPatch};
use crate::store::RecordStore;

/// Validated fields for a new session.
#[derive(Debug, Clone)]
pub struct SessionInput {
    pub title: String,
    pub skills: String,
    pub experience: String,
    pub description: String,
}

impl SessionInput {
    pub fn new(
        title: &str,
        skills: &str,
        experience: &str,
        description: &str,
    ) -> Result<Self, AppError> {
        Ok(Self {
            title: require_field(title, "Please provide a title")?,
            skills: require_skills(skills)?,
            experience: require_field(experience, "Please specify experience level")?,
            description: require_field(description, "Please provide a description")?,
        })
    }
}

/// Validates each present field of a partial update. An empty patch is rejected.
pub fn validate_patch(patch: SessionPatch) -> Result<SessionPatch, AppError> {
    let patch = SessionPatch {
        title: patch
            .title
            .map(|t| require_field(&t, "Please provide a title"))
            .transpose()?,
        skills: patch.skills.map(|s| require_skills(&s)).transpose()?,
        experience: patch
            .experience
            .map(|e| require_field(&e, "Please specify experience level"))
            .transpose()?,
        description: patch
            .description
            .map(|d| require_field(&d, "Please provide a description"))
            .transpose()?,
    };

    if patch.is_empty() {
        return Err(AppError::Validation(
            "Provide at least one of title, skills, experience, description".to_string(),
        ));
    }
    Ok(patch)
}

fn require_field(value: &str, message: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(value.to_string())
}

fn require_skills(value: &str) -> Result<String, AppError> {
    let has_skill = value.split(',').any(|s| !s.trim().is_empty());
    if !has_skill {
        return Err(AppError::Validation("Please specify skills".to_string()));
    }
    Ok(value.trim().to_string())
}

pub async fn create_session(
    store: &dyn RecordStore,
    llm: &dyn TextGenerator,
    user_id: Uuid,
    input: SessionInput,
) -> Result<PopulatedSession, AppError> {
    let request = QuestionRequest::new(
        &input.title,
        &input.experience,
        &input.skills,
        QUESTIONS_PER_BATCH,
    )?;

    // The session must exist before any question can reference it.
    let row = store
        .create_session(NewSession {
            user_id,
            title: input.title,
            skills: input.skills,
            experience: input.experience,
            description: input.description,
        })
        .await?;

    let questions = generate_questions(llm, &request, Batch::Initial).await;
    let appended = store
        .append_questions(row.id, user_id, questions)
        .await?
        .ok_or_else(AppError::session_not_found)?;

    info!(
        "Session {} created with {} questions for user {user_id}",
        row.id,
        appended.len()
    );

    store
        .find_session(row.id, user_id)
        .await?
        .ok_or_else(AppError::session_not_found)
}

pub async fn generate_more_questions(
    store: &dyn RecordStore,
    llm: &dyn TextGenerator,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<QuestionRow>, AppError> {
    let session = store
        .find_session(session_id, user_id)
        .await?
        .ok_or_else(AppError::session_not_found)?;

    let request = QuestionRequest::new(
        &session.title,
        &session.experience,
        &session.skills,
        QUESTIONS_PER_BATCH,
    )?;

    let questions = generate_questions(llm, &request, Batch::More).await;
    let appended = store
        .append_questions(session_id, user_id, questions)
        .await?
        .ok_or_else(AppError::session_not_found)?;

    info!(
        "Appended {} questions to session {session_id}",
        appended.len()
    );
    Ok(appended)
}

/// The question must belong to both the named session and the caller.
pub async fn question_details(
    store: &dyn RecordStore,
    llm: &dyn TextGenerator,
    session_id: Uuid,
    question_id: Uuid,
    user_id: Uuid,
) -> Result<Explanation, AppError> {
    store
        .find_session(session_id, user_id)
        .await?
        .ok_or_else(AppError::session_not_found)?;

    let question = store
        .find_question(question_id, session_id, user_id)
        .await?
        .ok_or_else(AppError::question_not_found)?;

    Ok(explain_question(llm, &question.question_text).await)
}
