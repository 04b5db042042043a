//! Configuration types for pixiv-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Catalog endpoint settings (where searches and top listings are requested)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Site root for the AJAX endpoints (default: "https://www.pixiv.net")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Language requested from the endpoints (default: "en")
    #[serde(default = "default_language")]
    pub language: String,

    /// User agent sent with catalog requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for a single catalog request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: default_language(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Download behavior configuration (destination, image host, batch bookkeeping)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory under which one folder per query is created (default: ".")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Image host serving the rendered illustrations (default: "https://i.pximg.net")
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Referer sent with image requests; the image host answers 403 without it
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Upper bound for a single illustration fetch in seconds (default: 60, 0 = wait forever)
    #[serde(
        default = "default_item_timeout",
        with = "optional_duration_serde"
    )]
    pub item_timeout: Option<Duration>,

    /// Number of results kept in the recent-result log (default: 5)
    #[serde(default = "default_recent_log_capacity")]
    pub recent_log_capacity: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            image_base_url: default_image_base_url(),
            referer: default_referer(),
            item_timeout: default_item_timeout(),
            recent_log_capacity: default_recent_log_capacity(),
        }
    }
}

/// Terminal presentation settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UiConfig {
    /// Widest the input field and progress bar are ever drawn (default: 80)
    #[serde(default = "default_max_width")]
    pub max_width: u16,

    /// Left padding in columns (default: 2)
    #[serde(default = "default_padding")]
    pub padding: u16,

    /// Maximum query length accepted by the input field (default: 80)
    #[serde(default = "default_char_limit")]
    pub char_limit: usize,

    /// Interval between spinner/blink/animation frames in milliseconds (default: 100)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Quit as soon as a batch finishes instead of waiting for another query
    #[serde(default)]
    pub exit_when_finished: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            padding: default_padding(),
            char_limit: default_char_limit(),
            tick_interval_ms: default_tick_interval_ms(),
            exit_when_finished: false,
        }
    }
}

impl UiConfig {
    /// Frame interval as a [`Duration`]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Main configuration for pixiv-dl
///
/// Every field has a default, so an empty TOML file (or no file at all)
/// yields a working configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog endpoint settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Terminal presentation settings
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        let config = Self::from_toml(&raw)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.catalog.base_url)
            .map_err(|e| Error::config(format!("invalid URL: {}", e), "catalog.base_url"))?;
        url::Url::parse(&self.download.image_base_url).map_err(|e| {
            Error::config(format!("invalid URL: {}", e), "download.image_base_url")
        })?;
        if self.download.recent_log_capacity == 0 {
            return Err(Error::config(
                "must be greater than zero",
                "download.recent_log_capacity",
            ));
        }
        if self.ui.max_width == 0 {
            return Err(Error::config("must be greater than zero", "ui.max_width"));
        }
        if self.ui.tick_interval_ms == 0 {
            return Err(Error::config(
                "must be greater than zero",
                "ui.tick_interval_ms",
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://www.pixiv.net".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_image_base_url() -> String {
    "https://i.pximg.net".to_string()
}

fn default_referer() -> String {
    "https://www.pixiv.net".to_string()
}

fn default_item_timeout() -> Option<Duration> {
    Some(Duration::from_secs(60))
}

fn default_recent_log_capacity() -> usize {
    5
}

fn default_max_width() -> u16 {
    80
}

fn default_padding() -> u16 {
    2
}

fn default_char_limit() -> usize {
    80
}

fn default_tick_interval_ms() -> u64 {
    100
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_u64(d.as_secs()),
            None => serializer.serialize_u64(0),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // 0 disables the timeout
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.filter(|&s| s > 0).map(Duration::from_secs))
    }
}
