use std::env;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// HMAC secret for signing access tokens. If unset, a random per-boot
    /// secret is generated and tokens do not survive a restart.
    pub const SECRET_KEY: &str = "SECRET_KEY";
    pub const ACCESS_TOKEN_EXPIRE_MINUTES: &str = "ACCESS_TOKEN_EXPIRE_MINUTES";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const DATABASE_URL: &str = "./.db/quill.db";
    pub const TOKEN_TTL_MINUTES: i64 = 30;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub secret_key: String,
    pub token_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var(env_vars::PORT)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults::PORT);

        let database_url = env::var(env_vars::DATABASE_URL)
            .unwrap_or_else(|_| defaults::DATABASE_URL.to_string());

        let secret_key = env::var(env_vars::SECRET_KEY)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(generate_boot_secret);

        let token_ttl_minutes = env::var(env_vars::ACCESS_TOKEN_EXPIRE_MINUTES)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults::TOKEN_TTL_MINUTES);

        Self {
            port,
            database_url,
            secret_key,
            token_ttl_minutes,
        }
    }
}

fn generate_boot_secret() -> String {
    let mut buf = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut buf);
    log::warn!("SECRET_KEY not set — using a generated per-boot signing secret");
    hex::encode(buf)
}
