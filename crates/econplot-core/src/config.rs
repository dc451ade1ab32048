//! Source credentials and transport settings.
//!
//! Keys are read from the process environment and never logged.

use std::fmt::{Debug, Formatter};

pub const FRED_API_KEY_ENV: &str = "FRED_API_KEY";
pub const BLS_API_KEY_ENV: &str = "BLS_API_KEY";

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Settings used to construct the source adapters.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub fred_api_key: Option<String>,
    pub bls_api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            bls_api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl SourceConfig {
    /// Reads `FRED_API_KEY` and `BLS_API_KEY`; blank values count as unset.
    pub fn from_env() -> Self {
        Self {
            fred_api_key: non_blank(std::env::var(FRED_API_KEY_ENV).ok()),
            bls_api_key: non_blank(std::env::var(BLS_API_KEY_ENV).ok()),
            ..Self::default()
        }
    }

    pub fn with_fred_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = non_blank(key) {
            self.fred_api_key = Some(key);
        }
        self
    }

    pub fn with_bls_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = non_blank(key) {
            self.bls_api_key = Some(key);
        }
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl Debug for SourceConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("fred_api_key", &self.fred_api_key.as_ref().map(|_| "<redacted>"))
            .field("bls_api_key", &self.bls_api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_ignore_blank_keys() {
        let config = SourceConfig::default()
            .with_fred_api_key(Some(String::from("abc")))
            .with_fred_api_key(Some(String::from("   ")))
            .with_bls_api_key(None);

        assert_eq!(config.fred_api_key.as_deref(), Some("abc"));
        assert_eq!(config.bls_api_key, None);
    }

    #[test]
    fn debug_output_redacts_keys() {
        let config = SourceConfig::default().with_fred_api_key(Some(String::from("secret-key")));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
