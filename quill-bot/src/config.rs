use std::env;

/// Environment variable names - single source of truth.
/// The Telegram token itself (TELOXIDE_TOKEN) is read by the bot client.
pub mod env_vars {
    pub const API_URL: &str = "API_URL";
    pub const SESSION_DB: &str = "BOT_SESSION_DB";
    pub const SESSION_TTL_MINUTES: &str = "BOT_SESSION_TTL_MINUTES";
}

/// Default values
pub mod defaults {
    pub const API_URL: &str = "http://localhost:8080";
    pub const SESSION_DB: &str = "./.db/quill-bot.db";
    pub const SESSION_TTL_MINUTES: i64 = 60;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_db: String,
    pub session_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Self {
        let api_url = env::var(env_vars::API_URL)
            .unwrap_or_else(|_| defaults::API_URL.to_string());

        let session_db = env::var(env_vars::SESSION_DB)
            .unwrap_or_else(|_| defaults::SESSION_DB.to_string());

        let session_ttl_minutes = env::var(env_vars::SESSION_TTL_MINUTES)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults::SESSION_TTL_MINUTES);

        Self {
            api_url,
            session_db,
            session_ttl_minutes,
        }
    }
}
