use std::str::FromStr;

use anyhow::ensure;
use serde::Deserialize;

/// Upper bound for `JWT_TTL_MINUTES`: ten years.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

/// Source of the token signing key, injected into the login workflow.
pub trait SigningKeySource: Send + Sync {
    fn signing_key(&self) -> &str;
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    pub fn validity(&self) -> time::Duration {
        time::Duration::seconds(self.ttl_minutes.saturating_mul(60))
    }
}

impl SigningKeySource for JwtConfig {
    fn signing_key(&self) -> &str {
        &self.secret
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long startup keeps retrying an unreachable database.
    pub connect_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Prefix for every route, e.g. `/dating`. Empty mounts at the root.
    pub base_path: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub http: HttpConfig,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn check_ttl_minutes(minutes: i64) -> anyhow::Result<i64> {
    ensure!(
        (1..=MAX_TTL_MINUTES).contains(&minutes),
        "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}

/// `"dating/"` -> `"/dating"`, `"/"` -> `""`.
pub(crate) fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")?,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 30),
            min_connections: env_or("DATABASE_MIN_CONNECTIONS", 0),
            connect_timeout_secs: env_or("DATABASE_CONNECT_TIMEOUT_SECS", 10),
            max_lifetime_secs: env_or("DATABASE_MAX_LIFETIME_SECS", 30 * 60),
            idle_timeout_secs: env_or("DATABASE_IDLE_TIMEOUT_SECS", 10 * 60),
        };
        ensure!(
            database.min_connections <= database.max_connections,
            "DATABASE_MIN_CONNECTIONS ({}) exceeds DATABASE_MAX_CONNECTIONS ({})",
            database.min_connections,
            database.max_connections
        );
        // An empty secret is accepted here; login reports it as a signing error.
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            ttl_minutes: check_ttl_minutes(env_or("JWT_TTL_MINUTES", 60 * 24))?,
        };
        let http = HttpConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
            base_path: normalize_base_path(
                &std::env::var("BASE_PATH").unwrap_or_else(|_| "/dating".into()),
            ),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
        };
        Ok(Self { database, jwt, http })
    }
}
