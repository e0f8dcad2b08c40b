//! Configuration management for the loan book server
//!
//! This module handles loading and validating configuration from environment variables,
//! with support for different environments (development, staging, production).

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get the environment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Who may call mutating endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiAccess {
    /// Every caller is treated as an administrator
    #[default]
    AllowAny,
    /// Mutations require the admin bearer token
    AdminOnly,
}

impl FromStr for ApiAccess {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow_any" | "any" => Ok(ApiAccess::AllowAny),
            "admin" | "admin_only" => Ok(ApiAccess::AdminOnly),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid API_ACCESS: '{}'. Expected: allow_any or admin",
                s
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Current environment
    pub environment: Environment,

    /// Bind host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Maximum database connections
    pub db_max_connections: u32,

    /// Seconds to wait for a pooled connection
    pub db_acquire_timeout_secs: u64,

    /// Seconds an idle pooled connection is kept
    pub db_idle_timeout_secs: u64,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,

    /// CORS allowed origins
    pub cors_allowed_origins: Option<String>,

    /// Prefix used to turn stored form references into absolute URLs
    pub media_base_url: String,

    /// Access policy for mutating endpoints
    pub api_access: ApiAccess,

    /// Bearer token accepted as admin when access is restricted
    pub admin_token: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| s.parse::<Environment>())
            .unwrap_or(Ok(Environment::Development))?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .unwrap_or(5);

        let db_acquire_timeout_secs = seconds_var("DB_ACQUIRE_TIMEOUT_SECS", 5)?;
        let db_idle_timeout_secs = seconds_var("DB_IDLE_TIMEOUT_SECS", 600)?;

        let run_migrations = env::var("RUN_MIGRATIONS")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let media_base_url = env::var("MEDIA_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}/media/", port));

        let api_access = env::var("API_ACCESS")
            .map(|s| s.parse::<ApiAccess>())
            .unwrap_or(Ok(ApiAccess::AllowAny))?;

        let admin_token = env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

        if api_access == ApiAccess::AdminOnly && admin_token.is_none() {
            return Err(ConfigError::MissingEnvVar("ADMIN_TOKEN".to_string()));
        }

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            database_url,
            environment,
            host,
            port,
            db_max_connections,
            db_acquire_timeout_secs,
            db_idle_timeout_secs,
            run_migrations,
            cors_allowed_origins,
            media_base_url,
            api_access,
            admin_token,
            log_level,
        })
    }

    /// Get database URL (useful for logging masked version)
    pub fn database_url_masked(&self) -> String {
        // Mask password in database URL for logging
        if let Some(at_pos) = self.database_url.find('@') {
            if let Some(colon_pos) = self.database_url[..at_pos].rfind(':') {
                let prefix = &self.database_url[..colon_pos + 1];
                let suffix = &self.database_url[at_pos..];
                return format!("{}****{}", prefix, suffix);
            }
        }
        self.database_url.clone()
    }
}

fn seconds_var(name: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => value.trim().parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(format!("{} must be a whole number of seconds", name))
        }),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
