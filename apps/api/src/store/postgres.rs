//! PostgreSQL implementation of the Record Store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{
    NewQuestion, NewSession, PopulatedSession, QuestionRow, SessionPatch, SessionRow,
};
use crate::models::user::{NewUser, User};
use crate::store::RecordStore;

const QUESTION_COLUMNS: &str =
    "id, session_id, user_id, question_text, answer, source, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn questions_for(&self, session_ids: &[Uuid]) -> Result<Vec<QuestionRow>, AppError> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions \
             WHERE session_id = ANY($1) ORDER BY created_at, seq"
        ))
        .bind(session_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn populate(&self, row: SessionRow) -> Result<PopulatedSession, AppError> {
        let questions = self.questions_for(&[row.id]).await?;
        Ok(PopulatedSession::new(row, questions))
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, full_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                AppError::Validation("An account with that email already exists".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_auth_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO auth_tokens (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token_hash)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_token_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_tokens WHERE token_hash = $1 AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }

    async fn delete_auth_token(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM auth_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_session(&self, session: NewSession) -> Result<SessionRow, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, user_id, title, skills, experience, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session.user_id)
        .bind(&session.title)
        .bind(&session.skills)
        .bind(&session.experience)
        .bind(&session.description)
        .fetch_one(&self.pool)
        .await?;

        info!("Created session {} for user {}", row.id, row.user_id);
        Ok(row)
    }

    async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<PopulatedSession>, AppError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut by_session: HashMap<Uuid, Vec<QuestionRow>> = HashMap::new();
        for question in self.questions_for(&ids).await? {
            by_session.entry(question.session_id).or_default().push(question);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let questions = by_session.remove(&row.id).unwrap_or_default();
                PopulatedSession::new(row, questions)
            })
            .collect())
    }

    async fn find_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<PopulatedSession>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.populate(row).await?)),
            None => Ok(None),
        }
    }

    async fn update_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        patch: SessionPatch,
    ) -> Result<Option<PopulatedSession>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE sessions SET
                title       = COALESCE($3, title),
                skills      = COALESCE($4, skills),
                experience  = COALESCE($5, experience),
                description = COALESCE($6, description),
                updated_at  = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(patch.title)
        .bind(patch.skills)
        .bind(patch.experience)
        .bind(patch.description)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.populate(row).await?)),
            None => Ok(None),
        }
    }

    async fn delete_session(&self, session_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM sessions WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            return Ok(false);
        }

        let removed = sqlx::query("DELETE FROM questions WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted session {session_id} and {removed} questions");
        Ok(true)
    }

    async fn append_questions(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        questions: Vec<NewQuestion>,
    ) -> Result<Option<Vec<QuestionRow>>, AppError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM sessions WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            return Ok(None);
        }

        let mut inserted = Vec::with_capacity(questions.len());
        for question in &questions {
            let row = sqlx::query_as::<_, QuestionRow>(&format!(
                r#"
                INSERT INTO questions (id, session_id, user_id, question_text, answer, source)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {QUESTION_COLUMNS}
                "#
            ))
            .bind(Uuid::new_v4())
            .bind(session_id)
            .bind(user_id)
            .bind(&question.question_text)
            .bind(&question.answer)
            .bind(question.source.as_str())
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row);
        }

        sqlx::query("UPDATE sessions SET updated_at = now() WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(inserted))
    }

    async fn find_question(
        &self,
        question_id: Uuid,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<QuestionRow>, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions \
             WHERE id = $1 AND session_id = $2 AND user_id = $3"
        ))
        .bind(question_id)
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
