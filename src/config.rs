//! Command-line arguments and the optional TOML config file.
//!
//! Every setting has a default, so the client runs with no file at all.
//! Values from the command line win over the file.
//!
//! ```toml
//! [api]
//! base_url = "https://cinimatch-backend.onrender.com"
//! request_timeout_secs = 15
//!
//! [feeds]
//! page_size = 10
//! genres = ["Action", "Drama"]
//!
//! [ui]
//! showcase_interval_ms = 5000
//! search_debounce_ms = 250
//!
//! [log]
//! file = "/tmp/cinimatch-tui.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::feed::DEFAULT_PAGE_SIZE;
use crate::search::DEFAULT_DEBOUNCE;
use crate::showcase::DEFAULT_INTERVAL;

#[derive(Parser, Debug, Default)]
#[command(name = "cinimatch-tui")]
#[command(about = "Browse, search and get movie recommendations in the terminal", long_about = None)]
pub struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the metadata API.
    #[arg(long)]
    pub api_base: Option<String>,

    /// Where to write the log.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    ParseError(String, toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub images: ImageConfig,
    pub feeds: FeedsConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cinimatch-backend.onrender.com".to_string(),
            request_timeout_secs: 15,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Image CDN prefixes joined with the relative paths in movie records.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub poster: String,
    pub backdrop: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            poster: "https://image.tmdb.org/t/p/w500".to_string(),
            backdrop: "https://image.tmdb.org/t/p/original".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub page_size: usize,
    /// One home screen row per entry, below "Trending".
    pub genres: Vec<String>,
    /// Size of the rotating showcase.
    pub top_picks: usize,
    pub similar_limit: usize,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            genres: ["Action", "Drama", "Comedy", "Horror", "Romance"]
                .into_iter()
                .map(String::from)
                .collect(),
            top_picks: 6,
            similar_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub showcase_interval_ms: u64,
    pub search_debounce_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            showcase_interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            search_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl UiConfig {
    pub fn showcase_interval(&self) -> Duration {
        Duration::from_millis(self.showcase_interval_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file.  Defaults to `cinimatch-tui.log` in the temp directory.
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: "cinimatch_tui=info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("cinimatch-tui.log"))
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let name = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(name.clone(), e))?;
        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError(_, err) => ConfigError::ParseError(name, err),
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError("<inline>".to_string(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `args` (if any) and apply the overrides.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(base) = &args.api_base {
            config.api.base_url = base.clone();
        }
        if let Some(file) = &args.log_file {
            config.log.file = Some(file.clone());
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feeds.page_size == 0 {
            return Err(ConfigError::Invalid("feeds.page_size must be positive".into()));
        }
        if self.feeds.top_picks == 0 {
            return Err(ConfigError::Invalid("feeds.top_picks must be positive".into()));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
