//! Runtime configuration for the thanks.io node.

use std::time::Duration;

/// Production API root; every endpoint path is appended to it.
pub const DEFAULT_BASE_URL: &str = "https://api.thanks.io/api/v2";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where requests go and how long they may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThanksIoConfig {
    /// API root without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ThanksIoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ThanksIoConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Defaults overridden by `THANKS_IO_BASE_URL` and `THANKS_IO_TIMEOUT_SECS`.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("THANKS_IO_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(secs) = lookup("THANKS_IO_TIMEOUT_SECS").and_then(|s| s.trim().parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    /// Fully-qualified URL for an endpoint path such as `/recipients`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production() {
        let config = ThanksIoConfig::default();
        assert_eq!(config.url("/ping"), "https://api.thanks.io/api/v2/ping");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config = ThanksIoConfig::from_lookup(|key| match key {
            "THANKS_IO_BASE_URL" => Some("http://127.0.0.1:9000/api/v2/".into()),
            "THANKS_IO_TIMEOUT_SECS" => Some("5".into()),
            _ => None,
        });
        assert_eq!(config.url("/recipients"), "http://127.0.0.1:9000/api/v2/recipients");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_keeps_default() {
        let config = ThanksIoConfig::from_lookup(|key| {
            (key == "THANKS_IO_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config, ThanksIoConfig::default());
    }
}
