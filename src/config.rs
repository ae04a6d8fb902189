// src/config.rs

use std::{env, fmt, net::SocketAddr, path::PathBuf, str::FromStr};

use dotenvy::dotenv;

/// What to do with a freshly inserted comment when its media attachment fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFailurePolicy {
    /// Abort the whole call; neither the comment nor the attachment persists.
    #[default]
    Rollback,
    /// Commit the text comment and return it without media.
    KeepText,
}

impl FromStr for MediaFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rollback" => Ok(Self::Rollback),
            "keep_text" | "keep-text" => Ok(Self::KeepText),
            other => Err(ConfigError::Invalid("MEDIA_FAILURE_POLICY", other.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key, value) => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,

    /// Base URL of the catalog lookup service (OMDb-style `?i=<id>` API).
    pub catalog_base_url: String,
    pub catalog_api_key: Option<String>,

    /// Directory where uploaded comment media is written.
    pub upload_dir: PathBuf,
    /// Largest accepted media payload, in bytes.
    pub max_upload_bytes: usize,
    pub media_failure_policy: MediaFailurePolicy,
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = parsed("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let catalog_base_url = env::var("CATALOG_BASE_URL")
            .unwrap_or_else(|_| "https://www.omdbapi.com".to_string());
        let catalog_api_key = env::var("CATALOG_API_KEY").ok().filter(|k| !k.is_empty());

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads/comments"));
        let max_upload_bytes = parsed("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let media_failure_policy = parsed("MEDIA_FAILURE_POLICY", MediaFailurePolicy::default())?;

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            catalog_base_url,
            catalog_api_key,
            upload_dir,
            max_upload_bytes,
            media_failure_policy,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_policy_parses_both_spellings() {
        assert_eq!("rollback".parse::<MediaFailurePolicy>().unwrap(), MediaFailurePolicy::Rollback);
        assert_eq!("KEEP_TEXT".parse::<MediaFailurePolicy>().unwrap(), MediaFailurePolicy::KeepText);
        assert_eq!("keep-text".parse::<MediaFailurePolicy>().unwrap(), MediaFailurePolicy::KeepText);
        assert!("sometimes".parse::<MediaFailurePolicy>().is_err());
    }

    #[test]
    fn config_error_names_the_key() {
        let err = ConfigError::Missing("DATABASE_URL");
        assert_eq!(err.to_string(), "DATABASE_URL must be set");
    }
}
