//! Client configuration: API origin, request timeout and storage location.
//!
//! Values come from CLI flags first, then `SCA_*` environment variables, then
//! the local development defaults.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const API_URL_ENV: &str = "SCA_API_URL";
pub const TIMEOUT_ENV: &str = "SCA_HTTP_TIMEOUT_SECS";
pub const DATA_DIR_ENV: &str = "SCA_DATA_DIR";

const DATA_DIR_NAME: &str = "sca-hospital";
const STORAGE_FILE: &str = "session.db";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL '{value}': {reason}")]
    InvalidApiUrl { value: String, reason: String },

    #[error("invalid request timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),

    #[error("no platform data directory; set {DATA_DIR_ENV} or pass --data-dir")]
    NoDataDir,
}

/// Values given explicitly (CLI flags); each one overrides its env variable.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin of the REST API, without a trailing slash.
    pub api_url: String,
    pub timeout: Duration,
    /// SQLite file holding the persisted session.
    pub storage_path: PathBuf,
}

impl ClientConfig {
    pub fn new(
        api_url: &str,
        timeout: Duration,
        storage_path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        Ok(Self {
            api_url: validate_api_url(api_url)?,
            timeout,
            storage_path: storage_path.into(),
        })
    }

    /// Resolve configuration from the process environment.
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::load_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with a custom variable lookup.
    pub fn load_with(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_url = overrides
            .api_url
            .or_else(|| env(API_URL_ENV))
            .unwrap_or_else(|| {
                tracing::debug!("{API_URL_ENV} not set; using {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            });

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => match env(TIMEOUT_ENV) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
                None => DEFAULT_TIMEOUT_SECS,
            },
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(timeout_secs.to_string()));
        }

        let data_dir = match overrides.data_dir.or_else(|| env(DATA_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => dirs::data_dir()
                .map(|dir| dir.join(DATA_DIR_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };

        Self::new(
            &api_url,
            Duration::from_secs(timeout_secs),
            data_dir.join(STORAGE_FILE),
        )
    }

    /// Absolute URL for an API path such as `/api/activos/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

fn validate_api_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidApiUrl {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let overrides = ConfigOverrides {
            data_dir: Some(PathBuf::from("/tmp/sca")),
            ..Default::default()
        };
        let config = ClientConfig::load_with(overrides, env_of(&[])).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.storage_path, PathBuf::from("/tmp/sca/session.db"));
    }

    #[test]
    fn flags_override_environment() {
        let env = env_of(&[
            (API_URL_ENV, "https://env.example.org"),
            (TIMEOUT_ENV, "30"),
            (DATA_DIR_ENV, "/var/lib/sca"),
        ]);
        let from_env = ClientConfig::load_with(ConfigOverrides::default(), &env).unwrap();
        assert_eq!(from_env.api_url, "https://env.example.org");
        assert_eq!(from_env.timeout, Duration::from_secs(30));
        assert_eq!(from_env.storage_path, PathBuf::from("/var/lib/sca/session.db"));

        let overrides = ConfigOverrides {
            api_url: Some("http://flag.example.org:9000/".into()),
            data_dir: Some(PathBuf::from("/opt/sca")),
            timeout_secs: Some(5),
        };
        let from_flags = ClientConfig::load_with(overrides, &env).unwrap();
        assert_eq!(from_flags.api_url, "http://flag.example.org:9000");
        assert_eq!(from_flags.timeout, Duration::from_secs(5));
        assert_eq!(from_flags.endpoint("/api/activos/"), "http://flag.example.org:9000/api/activos/");
    }

    #[test]
    fn rejects_bad_values() {
        let overrides = || ConfigOverrides {
            data_dir: Some(PathBuf::from("/tmp/sca")),
            ..Default::default()
        };
        assert!(matches!(
            ClientConfig::load_with(overrides(), env_of(&[(API_URL_ENV, "ftp://files.example.org")])),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::load_with(overrides(), env_of(&[(API_URL_ENV, "not a url")])),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
        assert_eq!(
            ClientConfig::load_with(overrides(), env_of(&[(TIMEOUT_ENV, "soon")])),
            Err(ConfigError::InvalidTimeout("soon".into()))
        );
        assert!(ClientConfig::new("http://localhost:8000", Duration::ZERO, "/tmp/x.db").is_err());
    }
}
