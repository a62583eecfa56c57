//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `OAKLINE_DATABASE_URL` - SQLite connection string (e.g., `sqlite://oakline.db`)
//! - `OAKLINE_TOKEN_SECRET` - Bearer-token signing secret (min 32 chars)
//!
//! ## Optional
//! - `OAKLINE_HOST` - Bind address (default: 127.0.0.1)
//! - `OAKLINE_PORT` - Listen port (default: 5000)
//! - `OAKLINE_TOKEN_TTL_DAYS` - Issued-token lifetime (default: 7)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database connection URL.
    pub database_url: String,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Bearer-token signing secret.
    pub token_secret: SecretString,
    /// Lifetime of issued tokens, in days.
    pub token_ttl_days: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, unparseable,
    /// or the token secret is too weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = get_required_env("OAKLINE_DATABASE_URL")?;

        let host = get_env_or("OAKLINE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("OAKLINE_HOST".to_owned(), e.to_string()))?;

        let port = get_env_or("OAKLINE_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("OAKLINE_PORT".to_owned(), e.to_string()))?;

        let token_ttl_days = get_env_or("OAKLINE_TOKEN_TTL_DAYS", "7")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("OAKLINE_TOKEN_TTL_DAYS".to_owned(), e.to_string())
            })?;

        let token_secret = get_validated_secret("OAKLINE_TOKEN_SECRET")?;

        Ok(Self {
            database_url,
            host,
            port,
            token_secret,
            token_ttl_days,
        })
    }

    /// Socket address to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

fn get_env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Load a signing secret, rejecting obviously weak values.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

fn validate_secret_strength(value: &str, key: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            key.to_owned(),
            format!("must be at least {MIN_TOKEN_SECRET_LENGTH} characters"),
        ));
    }
    Ok(())
}
