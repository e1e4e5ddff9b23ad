//! In-memory Record Store used by the test suite.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{
    NewQuestion, NewSession, PopulatedSession, QuestionRow, SessionPatch, SessionRow,
};
use crate::models::user::{NewUser, User};
use crate::store::RecordStore;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tokens: Vec<(String, Uuid, DateTime<Utc>)>,
    sessions: Vec<SessionRow>,
    questions: Vec<QuestionRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored question, regardless of owner. Used to check cascades.
    pub fn all_questions(&self) -> Vec<QuestionRow> {
        self.tables.lock().unwrap().questions.clone()
    }
}

impl Tables {
    fn populate(&self, row: &SessionRow) -> PopulatedSession {
        let questions = self
            .questions
            .iter()
            .filter(|q| q.session_id == row.id)
            .cloned()
            .collect();
        PopulatedSession::new(row.clone(), questions)
    }

    fn owned_session_mut(&mut self, session_id: Uuid, user_id: Uuid) -> Option<&mut SessionRow> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.user_id == user_id)
    }

    /// Strictly increasing timestamps keep insertion order observable through sorting.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let latest = self
            .sessions
            .iter()
            .map(|s| s.updated_at.max(s.created_at))
            .chain(self.questions.iter().map(|q| q.created_at))
            .max();
        let now = Utc::now();
        match latest {
            Some(latest) if latest >= now => latest + Duration::microseconds(1),
            _ => now,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Validation(
                "An account with that email already exists".to_string(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_auth_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables
            .tokens
            .push((token_hash.to_string(), user_id, expires_at));
        Ok(())
    }

    async fn find_token_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .tokens
            .iter()
            .find(|(hash, _, expires_at)| hash == token_hash && *expires_at > now)
            .map(|(_, user_id, _)| *user_id))
    }

    async fn delete_auth_token(&self, token_hash: &str) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.tokens.retain(|(hash, _, _)| hash != token_hash);
        Ok(())
    }

    async fn create_session(&self, session: NewSession) -> Result<SessionRow, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let now = tables.next_timestamp();
        let row = SessionRow {
            id: Uuid::new_v4(),
            user_id: session.user_id,
            title: session.title,
            skills: session.skills,
            experience: session.experience,
            description: session.description,
            created_at: now,
            updated_at: now,
        };
        tables.sessions.push(row.clone());
        Ok(row)
    }

    async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<PopulatedSession>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<&SessionRow> = tables
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows.into_iter().map(|row| tables.populate(row)).collect())
    }

    async fn find_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<PopulatedSession>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.id == session_id && s.user_id == user_id)
            .map(|row| tables.populate(row)))
    }

    async fn update_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        patch: SessionPatch,
    ) -> Result<Option<PopulatedSession>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let now = tables.next_timestamp();
        let Some(row) = tables.owned_session_mut(session_id, user_id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(skills) = patch.skills {
            row.skills = skills;
        }
        if let Some(experience) = patch.experience {
            row.experience = experience;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        row.updated_at = now;
        let row = row.clone();
        Ok(Some(tables.populate(&row)))
    }

    async fn delete_session(&self, session_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.owned_session_mut(session_id, user_id).is_none() {
            return Ok(false);
        }
        tables.questions.retain(|q| q.session_id != session_id);
        tables.sessions.retain(|s| s.id != session_id);
        Ok(true)
    }

    async fn append_questions(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        questions: Vec<NewQuestion>,
    ) -> Result<Option<Vec<QuestionRow>>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.owned_session_mut(session_id, user_id).is_none() {
            return Ok(None);
        }

        let mut inserted = Vec::with_capacity(questions.len());
        for question in questions {
            let row = QuestionRow {
                id: Uuid::new_v4(),
                session_id,
                user_id,
                question_text: question.question_text,
                answer: question.answer,
                source: question.source,
                created_at: tables.next_timestamp(),
            };
            tables.questions.push(row.clone());
            inserted.push(row);
        }

        let now = tables.next_timestamp();
        if let Some(row) = tables.owned_session_mut(session_id, user_id) {
            row.updated_at = now;
        }
        Ok(Some(inserted))
    }

    async fn find_question(
        &self,
        question_id: Uuid,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<QuestionRow>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .questions
            .iter()
            .find(|q| q.id == question_id && q.session_id == session_id && q.user_id == user_id)
            .cloned())
    }
}
