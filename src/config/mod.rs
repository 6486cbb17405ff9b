//! Configuration module for the portfolio backend.
//!
//! All configuration is loaded from environment variables (optionally from a
//! `.env` file) with sensible defaults.

use std::env;
use std::fmt;
use std::net::SocketAddr;

const DEFAULT_DATABASE_URL: &str = "sqlite://./data/portfolio.sqlite";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store connection string
    pub database_url: String,
    /// Secret used to sign session tokens
    pub jwt_secret: String,
    /// True when `jwt_secret` was generated for this process only
    pub jwt_secret_generated: bool,
    /// Session token lifetime in hours
    pub token_ttl_hours: i64,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// Push relay endpoint; notifications are skipped when unset
    pub push_relay_url: Option<String>,
    /// Bearer key for the push relay
    pub push_relay_key: Option<String>,
    /// VAPID public key served to browsers that want to subscribe
    pub vapid_public_key: Option<String>,
}

/// A configuration value that could not be parsed.
#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            var("PORTFOLIO_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let (jwt_secret, jwt_secret_generated) = match var("PORTFOLIO_JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (
                format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple()),
                true,
            ),
        };

        let token_ttl_hours = match var("PORTFOLIO_TOKEN_TTL_HOURS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError {
                        key: "PORTFOLIO_TOKEN_TTL_HOURS",
                        message: format!("expected a positive number of hours, got {:?}", raw),
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let bind_addr = var("PORTFOLIO_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError {
                key: "PORTFOLIO_BIND_ADDR",
                message: e.to_string(),
            })?;

        let log_level = var("PORTFOLIO_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_json = flag(var("PORTFOLIO_LOG_JSON"), "PORTFOLIO_LOG_JSON")?;
        let cookie_secure = flag(var("PORTFOLIO_COOKIE_SECURE"), "PORTFOLIO_COOKIE_SECURE")?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_secret_generated,
            token_ttl_hours,
            bind_addr,
            log_level,
            log_json,
            cookie_secure,
            push_relay_url: var("PORTFOLIO_PUSH_RELAY_URL"),
            push_relay_key: var("PORTFOLIO_PUSH_RELAY_KEY"),
            vapid_public_key: var("PORTFOLIO_VAPID_PUBLIC_KEY"),
        })
    }
}

/// Parse an optional boolean variable, defaulting to false.
fn flag(value: Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::trim) {
        None => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => Err(ConfigError {
            key,
            message: format!("expected true or false, got {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = load(&[]).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.jwt_secret_generated);
        assert!(config.jwt_secret.len() >= 32);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert!(!config.cookie_secure);
        assert!(config.push_relay_url.is_none());
        assert!(config.vapid_public_key.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let config = load(&[
            ("PORTFOLIO_DATABASE_URL", "sqlite:///srv/portfolio.sqlite"),
            ("PORTFOLIO_JWT_SECRET", "s3cret"),
            ("PORTFOLIO_TOKEN_TTL_HOURS", "12"),
            ("PORTFOLIO_BIND_ADDR", "0.0.0.0:3000"),
            ("PORTFOLIO_COOKIE_SECURE", "true"),
            ("PORTFOLIO_LOG_JSON", "1"),
            ("PORTFOLIO_PUSH_RELAY_URL", "https://relay.example.com/send"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite:///srv/portfolio.sqlite");
        assert_eq!(config.jwt_secret, "s3cret");
        assert!(!config.jwt_secret_generated);
        assert_eq!(config.token_ttl_hours, 12);
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.cookie_secure);
        assert!(config.log_json);
        assert_eq!(
            config.push_relay_url.as_deref(),
            Some("https://relay.example.com/send")
        );
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[
            ("PORTFOLIO_JWT_SECRET", "  "),
            ("PORTFOLIO_PUSH_RELAY_URL", ""),
        ])
        .unwrap();
        assert!(config.jwt_secret_generated);
        assert!(config.push_relay_url.is_none());
    }

    #[test]
    fn test_malformed_values_are_errors() {
        let err = load(&[("PORTFOLIO_BIND_ADDR", "not-an-address")]).unwrap_err();
        assert_eq!(err.key, "PORTFOLIO_BIND_ADDR");

        let err = load(&[("PORTFOLIO_TOKEN_TTL_HOURS", "0")]).unwrap_err();
        assert_eq!(err.key, "PORTFOLIO_TOKEN_TTL_HOURS");

        let err = load(&[("PORTFOLIO_COOKIE_SECURE", "maybe")]).unwrap_err();
        assert_eq!(err.key, "PORTFOLIO_COOKIE_SECURE");
    }
}
