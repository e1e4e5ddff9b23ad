use chrono::{DateTime, Utc};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Where a question's content came from. Stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    AiGenerated,
    Fallback,
}

impl QuestionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionSource::AiGenerated => "ai_generated",
            QuestionSource::Fallback => "fallback",
        }
    }

    pub fn is_ai_generated(self) -> bool {
        matches!(self, QuestionSource::AiGenerated)
    }
}

#[derive(Debug, Error)]
#[error("unknown question source '{0}'")]
pub struct UnknownSource(String);

impl TryFrom<String> for QuestionSource {
    type Error = UnknownSource;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "ai_generated" => Ok(QuestionSource::AiGenerated),
            "fallback" => Ok(QuestionSource::Fallback),
            _ => Err(UnknownSource(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub question_text: String,
    pub answer: String,
    #[sqlx(try_from = "String")]
    pub source: QuestionSource,
    pub created_at: DateTime<Utc>,
}

/// Emits both the tagged `source` and the `isAIGenerated` flag existing clients read.
impl Serialize for QuestionRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Question", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("session", &self.session_id)?;
        state.serialize_field("user", &self.user_id)?;
        state.serialize_field("questionText", &self.question_text)?;
        state.serialize_field("answer", &self.answer)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("isAIGenerated", &self.source.is_ai_generated())?;
        state.serialize_field("createdAt", &self.created_at)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub skills: String,
    pub experience: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A session with its questions resolved, oldest question first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedSession {
    pub id: Uuid,
    pub user: Uuid,
    pub title: String,
    pub skills: String,
    pub experience: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub questions: Vec<QuestionRow>,
}

impl PopulatedSession {
    pub fn new(row: SessionRow, questions: Vec<QuestionRow>) -> Self {
        Self {
            id: row.id,
            user: row.user_id,
            title: row.title,
            skills: row.skills,
            experience: row.experience,
            description: row.description,
            created_at: row.created_at,
            last_updated: row.updated_at,
            questions,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: Uuid,
    pub title: String,
    pub skills: String,
    pub experience: String,
    pub description: String,
}

/// Partial replacement of the editable session fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub description: Option<String>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.skills.is_none()
            && self.experience.is_none()
            && self.description.is_none()
    }
}

/// A generated question/answer pair awaiting persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub question_text: String,
    pub answer: String,
    pub source: QuestionSource,
}
