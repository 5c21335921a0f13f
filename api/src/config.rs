/// Service configuration module
/// Loads listen address, rule bounds and session storage settings from the environment

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::validation::{DEFAULT_NAME_MAX_LENGTH, NAME_MIN_LENGTH};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_IDLE_TTL_SECS: u64 = 30 * 60;
const DEFAULT_MAX_SESSIONS: u64 = 10_000;
/// Same order of magnitude as a browser's per-origin session storage
const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Read `name` and parse it, falling back to `default` when unset
fn parse_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            name,
            value: raw,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Per-browser-session storage settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// `false` makes every storage operation fail, as with disabled browser storage
    pub enabled: bool,
    /// A session ends after this long without a request
    pub idle_ttl: Duration,
    pub max_sessions: u64,
    pub quota_bytes: usize,
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_ttl: Duration::from_secs(DEFAULT_IDLE_TTL_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            secure_cookie: false,
        }
    }
}

impl SessionConfig {
    /// Load session configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let enabled = parse_env("SESSION_STORAGE_ENABLED", defaults.enabled)?;
        let idle_ttl_secs = parse_env("SESSION_IDLE_TTL_SECONDS", DEFAULT_IDLE_TTL_SECS)?;
        let max_sessions = parse_env("SESSION_MAX_SESSIONS", defaults.max_sessions)?;
        let quota_bytes = parse_env("SESSION_QUOTA_BYTES", defaults.quota_bytes)?;
        let secure_cookie = parse_env("SESSION_COOKIE_SECURE", defaults.secure_cookie)?;

        if idle_ttl_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "SESSION_IDLE_TTL_SECONDS must be greater than zero".to_string(),
            ));
        }

        let config = Self {
            enabled,
            idle_ttl: Duration::from_secs(idle_ttl_secs),
            max_sessions,
            quota_bytes,
            secure_cookie,
        };

        debug!(
            "Session configuration loaded: enabled={}, idle_ttl={:?}, max_sessions={}, quota={}B",
            config.enabled, config.idle_ttl, config.max_sessions, config.quota_bytes
        );

        Ok(config)
    }
}

/// Service configuration combining all settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub name_max_length: usize,
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            name_max_length: DEFAULT_NAME_MAX_LENGTH,
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load full service configuration
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = parse_env(
            "HELLOWORLD_BIND_ADDR",
            DEFAULT_BIND_ADDR
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?,
        )?;

        let name_max_length = parse_env("NAME_MAX_LENGTH", DEFAULT_NAME_MAX_LENGTH)?;
        if name_max_length < NAME_MIN_LENGTH {
            return Err(ConfigError::InvalidConfig(format!(
                "NAME_MAX_LENGTH must be at least {}",
                NAME_MIN_LENGTH
            )));
        }

        let session = SessionConfig::from_env()?;

        info!(
            "Service configuration loaded: bind_addr={}, name_max_length={}, session_storage={}",
            bind_addr,
            name_max_length,
            if session.enabled { "enabled" } else { "disabled" }
        );

        Ok(Self {
            bind_addr,
            name_max_length,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr.port(), 3001);
        assert_eq!(config.name_max_length, 100);
        assert!(config.session.enabled);
        assert_eq!(config.session.idle_ttl, Duration::from_secs(1800));
    }

    // Every env-dependent assertion lives in one test so parallel tests never
    // observe each other's variables.
    #[test]
    fn test_from_env() {
        env::remove_var("HELLOWORLD_BIND_ADDR");
        env::remove_var("NAME_MAX_LENGTH");
        env::remove_var("SESSION_STORAGE_ENABLED");
        env::remove_var("SESSION_IDLE_TTL_SECONDS");

        let config = AppConfig::from_env().expect("Should load with defaults");
        assert_eq!(config.name_max_length, DEFAULT_NAME_MAX_LENGTH);
        assert!(config.session.enabled);

        env::set_var("NAME_MAX_LENGTH", "60");
        env::set_var("SESSION_STORAGE_ENABLED", "false");
        let config = AppConfig::from_env().expect("Should load overrides");
        assert_eq!(config.name_max_length, 60);
        assert!(!config.session.enabled);

        env::set_var("NAME_MAX_LENGTH", "1");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::InvalidConfig(_))
        ));

        env::set_var("NAME_MAX_LENGTH", "lots");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::InvalidValue { name: "NAME_MAX_LENGTH", .. })
        ));

        env::remove_var("NAME_MAX_LENGTH");
        env::set_var("SESSION_IDLE_TTL_SECONDS", "0");
        assert!(SessionConfig::from_env().is_err());

        env::remove_var("SESSION_STORAGE_ENABLED");
        env::remove_var("SESSION_IDLE_TTL_SECONDS");
    }
}
