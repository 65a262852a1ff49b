//! Client configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//! `SCHOLARFLOW_API_URL` overrides `base_url` when set.
//!
//! ```toml
//! base_url = "https://editor.scholarflow.example"
//! request_timeout_secs = 20
//!
//! [cache.manuscripts_in_process]
//! ttl_ms = 10000
//! ```

use crate::error::{ApiError, ApiResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use sf_cache::CacheSettings;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`ClientConfig::base_url`]
pub const API_URL_ENV: &str = "SCHOLARFLOW_API_URL";

/// Default environment variable holding the access token
pub const DEFAULT_TOKEN_ENV: &str = "SCHOLARFLOW_TOKEN";

/// Per-family cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// RBAC context
    pub rbac_context: CacheSettings,
    /// Assistant editor lists
    pub assistant_editors: CacheSettings,
    /// Manuscripts in process
    pub manuscripts_in_process: CacheSettings,
    /// Review reports per manuscript
    pub manuscript_reviews: CacheSettings,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            rbac_context: CacheSettings::new(Duration::from_secs(30)).with_max_capacity(8),
            assistant_editors: CacheSettings::new(Duration::from_secs(60)),
            manuscripts_in_process: CacheSettings::new(Duration::from_secs(15)),
            manuscript_reviews: CacheSettings::new(Duration::from_secs(15)),
        }
    }
}

impl CachePolicy {
    fn families(&self) -> [(&'static str, &CacheSettings); 4] {
        [
            ("rbac_context", &self.rbac_context),
            ("assistant_editors", &self.assistant_editors),
            ("manuscripts_in_process", &self.manuscripts_in_process),
            ("manuscript_reviews", &self.manuscript_reviews),
        ]
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root, e.g. `https://editor.scholarflow.example`
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// `User-Agent` header
    pub user_agent: String,
    /// Environment variable holding the access token
    pub token_env: String,
    /// Cache tuning
    pub cache: CachePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            user_agent: format!("scholarflow-client/{}", env!("CARGO_PKG_VERSION")),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            cache: CachePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Parse TOML
    ///
    /// # Errors
    /// `ApiError::Config` on malformed TOML.
    pub fn from_toml_str(text: &str) -> ApiResult<Self> {
        toml::from_str(text).map_err(|err| ApiError::Config(err.to_string()))
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// `ApiError::Config` when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| ApiError::Config(format!("cannot read {}: {err}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded client config");
        Ok(config)
    }

    /// With base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            tracing::debug!(base_url = %url, "base url overridden from environment");
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// `ApiError::Config` naming the first offending field.
    pub fn validate(&self) -> ApiResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| ApiError::Config(format!("base_url '{}': {err}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ApiError::Config("request_timeout_secs must be positive".into()));
        }
        if self.token_env.trim().is_empty() {
            return Err(ApiError::Config("token_env must not be empty".into()));
        }
        for (family, settings) in self.cache.families() {
            if settings.max_capacity == 0 {
                return Err(ApiError::Config(format!(
                    "cache.{family}.max_capacity must be positive"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_toml_is_default() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn partial_cache_override_keeps_other_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
            base_url = "https://editor.example.org"

            [cache.manuscripts_in_process]
            ttl_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://editor.example.org");
        assert_eq!(config.cache.manuscripts_in_process.ttl(), Duration::from_secs(5));
        assert_eq!(config.cache.manuscripts_in_process.max_capacity, 1_000);
        assert_eq!(config.cache.assistant_editors, CachePolicy::default().assistant_editors);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = ClientConfig::from_toml_str("base_url = [").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = 7").unwrap();
        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(7));
    }

    #[test]
    fn from_file_missing_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn env_override_replaces_base_url() {
        let config = ClientConfig::default().with_overrides_from(|name| {
            (name == API_URL_ENV).then(|| " https://staging.example.org ".to_string())
        });
        assert_eq!(config.base_url, "https://staging.example.org");

        let untouched = ClientConfig::default().with_overrides_from(|_| Some(String::new()));
        assert_eq!(untouched.base_url, ClientConfig::default().base_url);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad_scheme = ClientConfig::default().with_base_url("ftp://files.example.org");
        assert!(bad_scheme.validate().is_err());

        let zero_timeout = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(zero_timeout.validate().is_err());

        let mut zero_capacity = ClientConfig::default();
        zero_capacity.cache.manuscript_reviews.max_capacity = 0;
        let err = zero_capacity.validate().unwrap_err();
        assert!(err.to_string().contains("manuscript_reviews"));
    }
}
