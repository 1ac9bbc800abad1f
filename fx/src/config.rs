//! PTAX engine configuration.

use ptax_common::constants;
use std::time::Duration;

use crate::engine::ResolveOptions;

/// Main engine configuration.
#[derive(Debug, Clone)]
pub struct PtaxConfig {
    /// Base location of the daily feed files.
    pub base_url: String,
    /// Default number of days tried per resolution.
    pub max_retries: u32,
    /// Default per-attempt timeout.
    pub timeout: Duration,
    /// Lifetime of cached rate sets.
    pub cache_ttl: Duration,
    /// User agent sent to the feed host.
    pub user_agent: String,
}

impl Default for PtaxConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            max_retries: constants::DEFAULT_MAX_RETRIES,
            timeout: Duration::from_millis(constants::DEFAULT_TIMEOUT_MS),
            cache_ttl: Duration::from_secs(constants::CACHE_TTL_SECS),
            user_agent: concat!("ptax/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl PtaxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("PTAX_BASE_URL") {
            config.base_url = url;
        }

        if let Some(retries) = lookup("PTAX_MAX_RETRIES") {
            if let Ok(retries) = retries.parse() {
                config.max_retries = retries;
            }
        }

        if let Some(timeout) = lookup("PTAX_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                config.timeout = Duration::from_millis(ms);
            }
        }

        if let Some(ttl) = lookup("PTAX_CACHE_TTL_SECS") {
            if let Ok(secs) = ttl.parse() {
                config.cache_ttl = Duration::from_secs(secs);
            }
        }

        if let Some(agent) = lookup("PTAX_USER_AGENT") {
            config.user_agent = agent;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Base URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("Base URL must be http(s): {}", self.base_url));
        }

        if self.max_retries == 0 {
            return Err("Max retries must be at least 1".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Timeout cannot be 0".to_string());
        }

        if self.cache_ttl.is_zero() {
            return Err("Cache TTL cannot be 0".to_string());
        }

        if self.user_agent.is_empty() || self.user_agent.chars().any(|c| c.is_control()) {
            return Err(format!("Invalid user agent: {:?}", self.user_agent));
        }

        Ok(())
    }

    /// Per-call options derived from this configuration.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            max_retries: self.max_retries,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = PtaxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(
            chrono::Duration::from_std(config.cache_ttl).unwrap(),
            constants::cache_ttl()
        );
    }

    #[test]
    fn test_from_lookup_overrides() {
        let env: HashMap<&str, &str> = [
            ("PTAX_BASE_URL", "http://localhost:9000/fechamento"),
            ("PTAX_MAX_RETRIES", "7"),
            ("PTAX_TIMEOUT_MS", "2500"),
            ("PTAX_CACHE_TTL_SECS", "60"),
        ]
        .into_iter()
        .collect();

        let config = PtaxConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.base_url, "http://localhost:9000/fechamento");
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparseable_values_keep_defaults() {
        let config = PtaxConfig::from_lookup(|k| match k {
            "PTAX_MAX_RETRIES" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = PtaxConfig::default();
        config.max_retries = 0;
        assert!(config.validate().is_err());

        let mut config = PtaxConfig::default();
        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = PtaxConfig::default();
        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_user_agent_with_newline_is_invalid() {
        let config = PtaxConfig::from_lookup(|k| match k {
            "PTAX_USER_AGENT" => Some("ptax\r\nX-Injected: 1".to_string()),
            _ => None,
        });
        let err = config.validate().unwrap_err();
        assert!(err.contains("user agent"));
    }

    #[test]
    fn test_resolve_options() {
        let options = PtaxConfig::default().resolve_options();
        assert_eq!(options, ResolveOptions::default());
    }
}
