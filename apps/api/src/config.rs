use anyhow::{Context, Result};

const DEFAULT_LLM_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub llm_api_url: String,
    /// Upper bound on a single generative call. Expiry falls through to the fallback content.
    pub llm_timeout_secs: u64,
    pub auth_token_ttl_days: i64,
    /// Allowed CORS origin. `None` means permissive CORS (local development).
    pub frontend_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_API_URL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
            auth_token_ttl_days: parse_env("AUTH_TOKEN_TTL_DAYS", 90)?,
            frontend_url: std::env::var("FRONTEND_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by in-process router tests. No variable is read from the environment.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://unused".to_string(),
            anthropic_api_key: "test-key".to_string(),
            llm_api_url: DEFAULT_LLM_API_URL.to_string(),
            llm_timeout_secs: 1,
            auth_token_ttl_days: 90,
            frontend_url: None,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
