//! Configuration management for the auth service
//!
//! Settings are loaded from environment variables, with a `.env` file picked
//! up in local development. Token signing secrets are mandatory and checked
//! for distinctness at load time: a misconfigured signing context is fatal at
//! process start, never a per-request failure.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub tokens: TokenSettings,
    pub email: EmailSettings,
    pub cors: CorsSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Load .env file in development
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            server: ServerSettings::from_env()?,
            database: DatabaseSettings::from_env()?,
            tokens: TokenSettings::from_env()?,
            email: EmailSettings::from_env()?,
            cors: CorsSettings::from_env(),
        })
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("Invalid SERVER_PORT")?,
        })
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: u64,
}

impl DatabaseSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            acquire_timeout: env::var("DATABASE_ACQUIRE_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid DATABASE_ACQUIRE_TIMEOUT")?,
        })
    }
}

/// Token signing secrets and lifetimes
///
/// One secret per token kind: a leaked access secret must not let anyone
/// forge refresh tokens, and reset tokens live in their own signing context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub reset_secret: String,
    /// Access token lifetime: minutes-scale, bounds suspension staleness
    pub access_ttl_secs: i64,
    /// Refresh token lifetime: days-scale
    pub refresh_ttl_secs: i64,
    /// Password-reset token lifetime: minutes-scale
    pub reset_ttl_secs: i64,
}

impl TokenSettings {
    fn from_env() -> Result<Self> {
        let access_secret =
            env::var("ACCESS_TOKEN_SECRET").context("ACCESS_TOKEN_SECRET must be set")?;
        let refresh_secret =
            env::var("REFRESH_TOKEN_SECRET").context("REFRESH_TOKEN_SECRET must be set")?;
        let reset_secret =
            env::var("RESET_TOKEN_SECRET").context("RESET_TOKEN_SECRET must be set")?;

        if access_secret == refresh_secret
            || access_secret == reset_secret
            || refresh_secret == reset_secret
        {
            bail!("Token secrets must be distinct per token kind");
        }

        Ok(Self {
            access_secret,
            refresh_secret,
            reset_secret,
            access_ttl_secs: env::var("ACCESS_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .context("Invalid ACCESS_TOKEN_TTL_SECS")?,
            refresh_ttl_secs: env::var("REFRESH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "604800".to_string())
                .parse()
                .context("Invalid REFRESH_TOKEN_TTL_SECS")?,
            reset_ttl_secs: env::var("RESET_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .context("Invalid RESET_TOKEN_TTL_SECS")?,
        })
    }
}

/// SMTP delivery configuration for the password-reset notifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub use_starttls: bool,
    pub password_reset_base_url: Option<String>,
}

impl EmailSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "1025".to_string())
                .parse()
                .context("Invalid SMTP_PORT")?,
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            smtp_from: env::var("SMTP_FROM").unwrap_or_else(|_| "noreply@campus.dev".to_string()),
            use_starttls: env::var("SMTP_USE_STARTTLS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            password_reset_base_url: env::var("PASSWORD_RESET_BASE_URL").ok(),
        })
    }
}

/// CORS allow-list for browser clients (cookie credentials enabled)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

impl CorsSettings {
    fn from_env() -> Self {
        let origins = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();
        Self {
            allowed_origins: origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}
