// src/config/mod.rs
// Environment-based configuration for the proxy server and the client

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::DEFAULT_MODEL;

/// Default bind host for the proxy
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default bind port for the proxy
pub const DEFAULT_PORT: u16 = 3000;

/// Errors detected while loading configuration at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Read a variable through `lookup`, strip trailing `# comments` and whitespace,
/// and parse it. Unparsable values fall back to the default with a warning.
fn env_var_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => {
                    debug!(key, value = clean_val, "Config value from environment");
                    parsed
                }
                Err(_) => {
                    warn!(key, value = %val, "Config parse failed, using default");
                    default
                }
            }
        }
        None => default,
    }
}

/// Read a key-like variable, filtering empty values
fn read_key<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|k| !k.trim().is_empty())
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Configuration for `explainer serve`
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    pub api_key: String,
}

impl ServerConfig {
    /// Load from `.env` and the process environment.
    ///
    /// A missing API key is reported here, before any socket is bound.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(process_env)
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = read_key(&lookup, "GEMINI_API_KEY")
            .or_else(|| read_key(&lookup, "GOOGLE_API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            host: env_var_or(&lookup, "EXPLAINER_HOST", DEFAULT_HOST.to_string()),
            port: env_var_or(&lookup, "EXPLAINER_PORT", DEFAULT_PORT),
            model: env_var_or(&lookup, "EXPLAINER_MODEL", DEFAULT_MODEL.to_string()),
            api_key,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for the client side (`ask` and `history` commands)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub history_dir: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_url = format!("http://{}:{}", DEFAULT_HOST, DEFAULT_PORT);
        let server_url = env_var_or(&lookup, "EXPLAINER_SERVER_URL", default_url);
        let history_dir = read_key(&lookup, "EXPLAINER_HISTORY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_history_dir);

        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            history_dir,
        }
    }
}

/// `~/.explainer`, or `./.explainer` when no home directory is known
pub fn default_history_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".explainer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_typed_error() {
        let err = ServerConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let err = ServerConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);
    }

    #[test]
    fn test_google_api_key_fallback() {
        let config = ServerConfig::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "g-key")])).unwrap();
        assert_eq!(config.api_key, "g-key");
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_port_with_comment_and_bad_value() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("EXPLAINER_PORT", "8080  # dev port"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);

        let config = ServerConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("EXPLAINER_PORT", "eighty"),
        ]))
        .unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_client_config() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("EXPLAINER_SERVER_URL", "http://example.test:9000/"),
            ("EXPLAINER_HISTORY_DIR", "/tmp/explainer-history"),
        ]));
        assert_eq!(config.server_url, "http://example.test:9000");
        assert_eq!(config.history_dir, PathBuf::from("/tmp/explainer-history"));
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.server_url, "http://127.0.0.1:3000");
        assert!(config.history_dir.ends_with(".explainer"));
    }
}
