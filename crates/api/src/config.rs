//! Process configuration, read once at startup.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use conduct_core::Email;
use conduct_observability::LogFormat;

const DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Required(&'static str),

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

/// Admin account created at startup so the service is reachable at all.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub email: Email,
    pub name: String,
    pub password: String,
}

impl core::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immutable application configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub token_ttl: Duration,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Development defaults around the given signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            environment: Environment::Development,
            jwt_secret: jwt_secret.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            token_ttl: Duration::hours(1),
            seed_admin: None,
            log_format: LogFormat::Json,
        }
    }

    pub fn with_seed_admin(mut self, admin: SeedAdmin) -> Self {
        self.seed_admin = Some(admin);
        self
    }

    /// True when running on the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_SECRET
    }

    /// Cookies carry `Secure` only in production.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (see [`AppConfig::from_env`]).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match var("APP_ENV").as_deref().map(str::trim) {
            None | Some("development") => Environment::Development,
            Some("production") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "APP_ENV",
                    format!("'{other}' (expected 'development' or 'production')"),
                ));
            }
        };

        let jwt_secret = match (var("JWT_SECRET"), environment) {
            (Some(secret), _) => secret,
            (None, Environment::Production) => return Err(ConfigError::Required("JWT_SECRET")),
            (None, Environment::Development) => DEV_SECRET.to_string(),
        };

        let mut config = Self::new(jwt_secret);
        config.environment = environment;

        if let Some(addr) = var("BIND_ADDR") {
            config.bind_addr = addr
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("BIND_ADDR", format!("{addr}: {e}")))?;
        }

        if let Some(ttl) = var("TOKEN_TTL_SECS") {
            let secs: i64 = ttl
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("TOKEN_TTL_SECS", format!("{ttl}: {e}")))?;
            if secs <= 0 {
                return Err(ConfigError::invalid("TOKEN_TTL_SECS", "must be positive"));
            }
            config.token_ttl = Duration::seconds(secs);
        }

        if let Some(format) = var("LOG_FORMAT") {
            config.log_format = format
                .parse()
                .map_err(|e: conduct_observability::UnknownLogFormat| {
                    ConfigError::invalid("LOG_FORMAT", e.to_string())
                })?;
        }

        config.seed_admin = match (var("SEED_ADMIN_EMAIL"), var("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin {
                email: Email::parse(&email)
                    .map_err(|e| ConfigError::invalid("SEED_ADMIN_EMAIL", e.to_string()))?,
                name: var("SEED_ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
                password,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::invalid("SEED_ADMIN_PASSWORD", "missing")),
            (None, Some(_)) => return Err(ConfigError::invalid("SEED_ADMIN_EMAIL", "missing")),
        };

        Ok(config)
    }
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .field("seed_admin", &self.seed_admin)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_in_development() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.jwt_secret, DEV_SECRET);
        assert!(config.uses_dev_secret());
        assert_eq!(config.token_ttl, Duration::hours(1));
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.secure_cookies());
        assert!(config.seed_admin.is_none());
    }

    #[test]
    fn production_requires_secret_and_secures_cookies() {
        assert_eq!(
            load(&[("APP_ENV", "production")]).unwrap_err(),
            ConfigError::Required("JWT_SECRET")
        );

        let config = load(&[("APP_ENV", "production"), ("JWT_SECRET", "s3cr3t")]).unwrap();
        assert!(config.secure_cookies());
        assert_eq!(config.jwt_secret, "s3cr3t");
        assert!(!config.uses_dev_secret());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("TOKEN_TTL_SECS", "0")]).is_err());
        assert!(load(&[("TOKEN_TTL_SECS", "soon")]).is_err());
        assert!(load(&[("BIND_ADDR", "localhost")]).is_err());
        assert!(load(&[("APP_ENV", "staging")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(load(&[("SEED_ADMIN_EMAIL", "a@school.edu")]).is_err());
    }

    #[test]
    fn reads_seed_admin() {
        let config = load(&[
            ("SEED_ADMIN_EMAIL", "Head@School.edu"),
            ("SEED_ADMIN_PASSWORD", "pw"),
            ("TOKEN_TTL_SECS", "600"),
            ("LOG_FORMAT", "pretty"),
        ])
        .unwrap();

        let admin = config.seed_admin.unwrap();
        assert_eq!(admin.email.as_str(), "head@school.edu");
        assert_eq!(admin.name, "Administrator");
        assert!(!format!("{admin:?}").contains("password"));
        assert_eq!(config.token_ttl, Duration::seconds(600));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }
}
