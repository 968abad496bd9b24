//! Runtime configuration read from the environment (and `.env`).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
/// Decimal price above which an outcome counts as an underdog opportunity (~+150)
pub const DEFAULT_UNDERDOG_THRESHOLD: f64 = 2.5;
const DEFAULT_PICKS_DIR: &str = "cache";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Missing keys are sent upstream anyway and come back as an auth failure
    pub odds_api_key: Option<String>,
    pub odds_api_base_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub cache_ttl: Duration,
    pub underdog_threshold: f64,
    pub picks_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            odds_api_key: None,
            odds_api_base_url: DEFAULT_ODDS_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            underdog_threshold: DEFAULT_UNDERDOG_THRESHOLD,
            picks_dir: PathBuf::from(DEFAULT_PICKS_DIR),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup, unset or blank values take the default
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let port = match get("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: v,
                expected: "a port number",
            })?,
            None => defaults.port,
        };

        let cache_ttl = match get("CACHE_TTL_SECS") {
            Some(v) => Duration::from_secs(v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "CACHE_TTL_SECS",
                value: v,
                expected: "a whole number of seconds",
            })?),
            None => defaults.cache_ttl,
        };

        let underdog_threshold = match get("UNDERDOG_THRESHOLD") {
            Some(v) => match v.trim().parse::<f64>() {
                Ok(t) if t.is_finite() && t > 1.0 => t,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "UNDERDOG_THRESHOLD",
                        value: v,
                        expected: "decimal odds above 1.0",
                    })
                }
            },
            None => defaults.underdog_threshold,
        };

        Ok(Self {
            odds_api_key: get("ODDS_API_KEY"),
            odds_api_base_url: get("ODDS_API_BASE_URL").unwrap_or(defaults.odds_api_base_url),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            cache_ttl,
            underdog_threshold,
            picks_dir: get("PICKS_DIR").map(PathBuf::from).unwrap_or(defaults.picks_dir),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.odds_api_key, None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.underdog_threshold, 2.5);
        assert_eq!(config.listen_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ODDS_API_KEY", "secret"),
            ("PORT", "8080"),
            ("CACHE_TTL_SECS", "60"),
            ("UNDERDOG_THRESHOLD", "3.0"),
            ("PICKS_DIR", "/tmp/picks"),
            ("BIND_ADDR", "0.0.0.0"),
        ]))
        .unwrap();

        assert_eq!(config.odds_api_key.as_deref(), Some("secret"));
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.underdog_threshold, 3.0);
        assert_eq!(config.picks_dir, PathBuf::from("/tmp/picks"));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = Config::from_lookup(lookup(&[("ODDS_API_KEY", "  ")])).unwrap();
        assert_eq!(config.odds_api_key, None);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CACHE_TTL_SECS", "-1")])).is_err());
        assert!(Config::from_lookup(lookup(&[("UNDERDOG_THRESHOLD", "0.5")])).is_err());
    }
}
