//! Application configuration structures.

use std::fs;
use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Issue listing discovery rules
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Issue page line-scan rules
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Output layout settings
    #[serde(default)]
    pub download: DownloadConfig,
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
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.connect_timeout_secs == 0 {
            return Err(AppError::validation(
                "crawler.connect_timeout_secs must be > 0",
            ));
        }
        let listing = url::Url::parse(&self.discovery.listing_url)?;
        if !matches!(listing.scheme(), "http" | "https") {
            return Err(AppError::validation(
                "discovery.listing_url must be an http(s) URL",
            ));
        }
        Selector::parse(&self.discovery.issue_selector)
            .map_err(|e| AppError::selector(&self.discovery.issue_selector, format!("{e:?}")))?;
        if self.extraction.trigger_marker.is_empty() {
            return Err(AppError::validation("extraction.trigger_marker is empty"));
        }
        Regex::new(&self.extraction.name_pattern)?;
        Regex::new(&self.extraction.pdf_pattern)?;
        if self.download.output_dir.trim().is_empty() {
            return Err(AppError::validation("download.output_dir is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds, body included
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Pause between sequential requests in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            connect_timeout_secs: defaults::connect_timeout(),
            request_delay_ms: 0,
        }
    }
}

/// Listing page discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Root archive page listing every issue
    #[serde(default = "defaults::listing_url")]
    pub listing_url: String,

    /// Base that relative issue links are appended to (defaults to `listing_url`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Selector for the issue anchors on the listing page
    #[serde(default = "defaults::issue_selector")]
    pub issue_selector: String,

    /// Path segment removed from issue URLs
    #[serde(default = "defaults::strip_segment")]
    pub strip_segment: String,
}

impl DiscoveryConfig {
    /// Base used for issue URL concatenation.
    pub fn base(&self) -> &str {
        self.base_url.as_deref().unwrap_or(&self.listing_url)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            listing_url: defaults::listing_url(),
            base_url: None,
            issue_selector: defaults::issue_selector(),
            strip_segment: defaults::strip_segment(),
        }
    }
}

/// What to do when a line after the trigger does not match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Drop the half-built record and keep scanning
    #[default]
    Skip,
    /// Fail the whole issue
    Abort,
}

/// Issue page line-scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Substring marking the line before an article name
    #[serde(default = "defaults::trigger_marker")]
    pub trigger_marker: String,

    /// Regex for the name line; capture group 1 is the name when present
    #[serde(default = "defaults::name_pattern")]
    pub name_pattern: String,

    /// Regex for the PDF link line
    #[serde(default = "defaults::pdf_pattern")]
    pub pdf_pattern: String,

    #[serde(default)]
    pub on_mismatch: MismatchPolicy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            trigger_marker: defaults::trigger_marker(),
            name_pattern: defaults::name_pattern(),
            pdf_pattern: defaults::pdf_pattern(),
            on_mismatch: MismatchPolicy::default(),
        }
    }
}

/// How article names become file names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenamePolicy {
    /// Use the article name unchanged
    Verbatim,
    /// Replace path separators and NUL
    #[default]
    Separators,
    /// Also replace characters reserved on Windows and control characters
    Portable,
}

/// Output layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Root directory for the volume tree
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub filenames: FilenamePolicy,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            filenames: FilenamePolicy::default(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; journal-archiver/0.1)".into()
    }
    pub fn timeout() -> u64 {
        300
    }
    pub fn connect_timeout() -> u64 {
        15
    }

    // Discovery defaults
    pub fn listing_url() -> String {
        "https://www.complex-systems.com/archives/".into()
    }
    pub fn issue_selector() -> String {
        ".issuex4>a".into()
    }
    pub fn strip_segment() -> String {
        "/archives".into()
    }

    // Extraction defaults
    pub fn trigger_marker() -> String {
        r#"<h3 class="absTitle">"#.into()
    }
    pub fn name_pattern() -> String {
        ">(.+)<".into()
    }
    pub fn pdf_pattern() -> String {
        r#"https://[^\s"'<>]*?\.pdf"#.into()
    }

    // Download defaults
    pub fn output_dir() -> String {
        "complex-systems".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_listing() {
        let mut config = Config::default();
        config.discovery.listing_url = "archives".to_string();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));

        config.discovery.listing_url = "ftp://example.com/archives/".to_string();
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_rejects_bad_patterns() {
        let mut config = Config::default();
        config.extraction.pdf_pattern = "https://(".to_string();
        assert!(matches!(config.validate(), Err(AppError::Regex(_))));

        let mut config = Config::default();
        config.discovery.issue_selector = "[[invalid".to_string();
        assert!(matches!(config.validate(), Err(AppError::Selector { .. })));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            request_delay_ms = 250

            [extraction]
            on_mismatch = "abort"

            [download]
            filenames = "portable"
            "#,
        )
        .unwrap();

        assert_eq!(config.crawler.request_delay_ms, 250);
        assert_eq!(config.crawler.timeout_secs, 300);
        assert_eq!(config.extraction.on_mismatch, MismatchPolicy::Abort);
        assert_eq!(config.extraction.trigger_marker, r#"<h3 class="absTitle">"#);
        assert_eq!(config.download.filenames, FilenamePolicy::Portable);
        assert_eq!(config.download.output_dir, "complex-systems");
    }

    #[test]
    fn base_falls_back_to_listing_url() {
        let mut discovery = DiscoveryConfig::default();
        assert_eq!(discovery.base(), "https://www.complex-systems.com/archives/");

        discovery.base_url = Some("https://example.com".to_string());
        assert_eq!(discovery.base(), "https://example.com");
    }
}
