//! Process configuration, read from the environment (and `.env` when present).

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use roster_infra::StorageConfig;
use roster_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset and empty values fall
    /// back to defaults; malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = StorageConfig::default();

        let bind_addr: SocketAddr = parse_var(
            "ROSTER_BIND_ADDR",
            get("ROSTER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let timeout = match get("ROSTER_STORAGE_TIMEOUT_MS") {
            Some(raw) => {
                let ms: u64 = parse_var("ROSTER_STORAGE_TIMEOUT_MS", raw.clone())?;
                if ms == 0 {
                    return Err(invalid("ROSTER_STORAGE_TIMEOUT_MS", raw, "must be greater than zero"));
                }
                Duration::from_millis(ms)
            }
            None => defaults.timeout,
        };

        let max_connections = match get("ROSTER_DB_MAX_CONNECTIONS") {
            Some(raw) => {
                let n: u32 = parse_var("ROSTER_DB_MAX_CONNECTIONS", raw.clone())?;
                if n == 0 {
                    return Err(invalid("ROSTER_DB_MAX_CONNECTIONS", raw, "must be greater than zero"));
                }
                n
            }
            None => defaults.max_connections,
        };

        let log_format = match get("ROSTER_LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|reason| invalid("ROSTER_LOG_FORMAT", raw, reason))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            storage: StorageConfig {
                database_url: get("DATABASE_URL"),
                timeout,
                max_connections,
            },
            log_format,
        })
    }
}

fn parse_var<T>(var: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(var, raw, e))
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
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_select_in_memory_store() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.storage, StorageConfig::default());
        assert_eq!(cfg.storage.timeout, Duration::from_secs(5));
        assert!(!cfg.storage.is_persistent());
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config_from(&[
            ("ROSTER_BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://roster@localhost/roster"),
            ("ROSTER_STORAGE_TIMEOUT_MS", "250"),
            ("ROSTER_DB_MAX_CONNECTIONS", "3"),
            ("ROSTER_LOG_FORMAT", "pretty"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(
            cfg.storage.database_url.as_deref(),
            Some("postgres://roster@localhost/roster")
        );
        assert_eq!(cfg.storage.timeout, Duration::from_millis(250));
        assert_eq!(cfg.storage.max_connections, 3);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn empty_database_url_means_in_memory() {
        let cfg = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(cfg.storage.database_url.is_none());
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = config_from(&[("ROSTER_STORAGE_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "ROSTER_STORAGE_TIMEOUT_MS", .. }
        ));

        let err = config_from(&[("ROSTER_STORAGE_TIMEOUT_MS", "0")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid ROSTER_STORAGE_TIMEOUT_MS=\"0\": must be greater than zero"
        );

        assert!(config_from(&[("ROSTER_BIND_ADDR", "localhost")]).is_err());
        assert!(config_from(&[("ROSTER_DB_MAX_CONNECTIONS", "-1")]).is_err());
        assert!(config_from(&[("ROSTER_LOG_FORMAT", "xml")]).is_err());
    }
}
