//! Configuration module for the registration backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Origin allowed in production when `REGISTRY_CLIENT_URL` is unset.
pub const DEFAULT_CLIENT_URL: &str = "https://ead-assignment2frontend.onrender.com";

/// Origins the form is served from during local development.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Deployment environment; decides which browser origins may call the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    pub environment: Environment,
    /// Frontend origin allowed in production
    pub client_url: String,
    /// Upper bound on each store call
    pub store_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("REGISTRY_DB_PATH")
            .unwrap_or_else(|_| "./data/students.sqlite".to_string())
            .into();

        let bind_addr = var_or("REGISTRY_BIND_ADDR", "0.0.0.0:4000");
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| invalid("REGISTRY_BIND_ADDR", bind_addr, e))?;

        let log_level = var_or("REGISTRY_LOG_LEVEL", "info");

        let log_format = match var_or("REGISTRY_LOG_FORMAT", "text").as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let environment = match var_or("REGISTRY_ENV", "development").as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };

        let client_url = var_or("REGISTRY_CLIENT_URL", DEFAULT_CLIENT_URL);

        let timeout_secs = var_or("REGISTRY_STORE_TIMEOUT_SECS", "10");
        let store_timeout = match timeout_secs.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            Ok(_) => {
                return Err(invalid(
                    "REGISTRY_STORE_TIMEOUT_SECS",
                    timeout_secs,
                    "must be positive",
                ))
            }
            Err(e) => return Err(invalid("REGISTRY_STORE_TIMEOUT_SECS", timeout_secs, e)),
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_format,
            environment,
            client_url,
            store_timeout,
        })
    }

    /// Browser origins allowed by CORS.
    pub fn allowed_origins(&self) -> Vec<String> {
        match self.environment {
            Environment::Production => vec![self.client_url.clone()],
            Environment::Development => DEV_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn invalid(var: &'static str, value: String, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    /// Tests in this module mutate the process environment.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: [&str; 7] = [
        "REGISTRY_DB_PATH",
        "REGISTRY_BIND_ADDR",
        "REGISTRY_LOG_LEVEL",
        "REGISTRY_LOG_FORMAT",
        "REGISTRY_ENV",
        "REGISTRY_CLIENT_URL",
        "REGISTRY_STORE_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.db_path, PathBuf::from("./data/students.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:4000");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert_eq!(
            config.allowed_origins(),
            vec!["http://localhost:5173", "http://localhost:3000"]
        );
    }

    #[test]
    fn test_production_uses_client_url() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("REGISTRY_ENV", "production");
        env::set_var("REGISTRY_CLIENT_URL", "https://students.example.org");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.allowed_origins(), vec!["https://students.example.org"]);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("REGISTRY_BIND_ADDR", "not-an-address");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid { var: "REGISTRY_BIND_ADDR", .. })
        ));
        env::remove_var("REGISTRY_BIND_ADDR");

        env::set_var("REGISTRY_STORE_TIMEOUT_SECS", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid { var: "REGISTRY_STORE_TIMEOUT_SECS", .. })
        ));
        clear_env();
    }
}
