//! Opaque bearer tokens. The raw token goes to the client once; only its SHA-256 digest is stored.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::AppError;
use crate::store::RecordStore;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub async fn issue_token(
    store: &dyn RecordStore,
    user_id: Uuid,
    ttl_days: i64,
) -> Result<IssuedToken, AppError> {
    let token = generate_token();
    let expires_at = Utc::now() + Duration::days(ttl_days);
    store
        .insert_auth_token(&digest(&token), user_id, expires_at)
        .await?;
    Ok(IssuedToken { token, expires_at })
}

/// The user a token belongs to, if it exists and has not expired.
pub async fn resolve_token(store: &dyn RecordStore, token: &str) -> Result<Option<Uuid>, AppError> {
    store.find_token_user(&digest(token), Utc::now()).await
}

pub async fn revoke_token(store: &dyn RecordStore, token: &str) -> Result<(), AppError> {
    store.delete_auth_token(&digest(token)).await
}
