//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Target forum identity
    #[serde(default)]
    pub forum: ForumConfig,

    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.forum.id.trim().is_empty() {
            return Err(AppError::validation("forum.id is empty"));
        }
        Url::parse(&self.forum.start_url)
            .map_err(|e| AppError::validation(format!("forum.start_url is invalid: {e}")))?;
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        Ok(())
    }
}

/// Identity of the forum being archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumConfig {
    /// Identifier recorded in the archive document
    #[serde(default = "defaults::forum_id")]
    pub id: String,

    /// Forum index page; also the fallback board key for threads whose
    /// breadcrumbs resolve to nothing
    #[serde(default = "defaults::start_url")]
    pub start_url: String,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            id: defaults::forum_id(),
            start_url: defaults::start_url(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for timestamped archive documents
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub(super) fn forum_id() -> String {
        "223".to_string()
    }

    pub(super) fn start_url() -> String {
        "https://www.tapatalk.com/groups/223/".to_string()
    }

    pub(super) fn user_agent() -> String {
        "Mozilla/5.0 (compatible; ForumCrawler/1.0)".to_string()
    }

    pub(super) fn timeout() -> u64 {
        30
    }

    pub(super) fn request_delay() -> u64 {
        1000
    }

    pub(super) fn max_concurrent() -> usize {
        2
    }

    pub(super) fn output_dir() -> PathBuf {
        PathBuf::from("archives")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [forum]
            id = "bikes"
            start_url = "https://forum.example.com/groups/bikes/"

            [crawler]
            max_concurrent = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.forum.id, "bikes");
        assert_eq!(config.crawler.max_concurrent, 4);
        assert_eq!(config.crawler.timeout_secs, 30);
        assert_eq!(config.paths.output_dir, PathBuf::from("archives"));
    }

    #[test]
    fn test_validate_rejects_bad_start_url() {
        let mut config = Config::default();
        config.forum.start_url = "nope".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.crawler.max_concurrent = 0;
        assert!(config.validate().is_err());
    }
}
