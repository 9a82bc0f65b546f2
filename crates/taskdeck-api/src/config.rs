//! Server configuration read from the environment.

use axum::http::HeaderValue;
use taskdeck_core::{Error, Result};
use taskdeck_db::PoolConfig;

/// Default request body limit (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Typed view of the environment variables the server reads.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub allowed_origins: Vec<HeaderValue>,
    pub max_body_bytes: usize,
    pub run_migrations: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            db_max_connections: taskdeck_db::pool::DEFAULT_MAX_CONNECTIONS,
            allowed_origins: parse_allowed_origins(DEFAULT_ALLOWED_ORIGINS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            run_migrations: true,
        }
    }
}

impl ApiConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// `DATABASE_URL` is required; everything else has a default. A value that
    /// fails to parse is an [`Error::Config`] naming the variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("DATABASE_URL must be set".to_string()))?;

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(raw) if !raw.trim().is_empty() => parse_allowed_origins(&raw),
            _ => defaults.allowed_origins,
        };

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            db_max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            allowed_origins,
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES", defaults.max_body_bytes)?,
            run_migrations: parse_bool(&lookup, "RUN_MIGRATIONS", defaults.run_migrations)?,
        })
    }

    /// Pool settings derived from this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new().max_connections(self.db_max_connections)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
        _ => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(Error::Config(format!(
            "{} has an invalid value: {}",
            key, other
        ))),
    }
}

/// Parse a comma-separated origin list, skipping entries that are not valid
/// header values.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x/y")])).unwrap();
        assert_eq!(config.database_url, "postgres://x/y");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.run_migrations);
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_missing_database_url_is_config_error() {
        let err = ApiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_port_names_the_variable() {
        let err = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.starts_with("PORT")));
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("RUN_MIGRATIONS", "false"),
            ("ALLOWED_ORIGINS", "https://app.example.com, ,https://admin.example.com"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.db_max_connections, 4);
        assert!(!config.run_migrations);
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("RUN_MIGRATIONS", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
