//! Application configuration module
//!
//! Provides the chat server configuration, its builder, and loading from an
//! optional TOML file plus environment variable overrides.
//!
//! # Sources
//!
//! Lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file named by `MICROCHAT_CONFIG`
//! 3. Environment variables (`MICROCHAT_ADDR`, `SERVER_PORT`, ...)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::broker::options::MAX_TIMEOUT_LIMIT;
use crate::broker::BrokerOptions;

/// Topic every post is also published to
pub const ALL_CHATS: &str = "all_chats";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CHAT_HOURS: u64 = 24;
const DEFAULT_TOPIC_REFRESH_SECS: u64 = 30;
const DEFAULT_MAX_TOPIC_LISTS: usize = 10;
const DEFAULT_CHATS_ON_SCREEN: usize = 50;
const DEFAULT_MAX_TIMEOUT_SECS: u64 = 110;
const DEFAULT_REAPER_INTERVAL_SECS: u64 = 300;

/// Buffered events per topic, relative to what a client shows at once
const BUFFER_MULTIPLIER: usize = 10;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// How long chats are retained, in hours
    pub max_chat_life_hours: u64,
    /// How often clients refresh their topic boards, in seconds
    pub topic_refresh_seconds: u64,
    /// How many topics the popular/recent boards list
    pub max_topic_lists: usize,
    /// How many chats a client shows at once
    pub chats_on_screen: usize,
    /// Largest long-poll timeout a client may request, in seconds
    pub max_timeout_seconds: u64,
    /// Directory of static client assets, if any
    pub static_dir: Option<PathBuf>,
    /// Interval between expiry/reaping passes, in seconds
    pub reaper_interval_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_chat_life_hours: DEFAULT_MAX_CHAT_HOURS,
            topic_refresh_seconds: DEFAULT_TOPIC_REFRESH_SECS,
            max_topic_lists: DEFAULT_MAX_TOPIC_LISTS,
            chats_on_screen: DEFAULT_CHATS_ON_SCREEN,
            max_timeout_seconds: DEFAULT_MAX_TIMEOUT_SECS,
            static_dir: None,
            reaper_interval_seconds: DEFAULT_REAPER_INTERVAL_SECS,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    ///
    /// Every count and duration must be at least 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chat_life_hours < 1 {
            return Err(ConfigError::OutOfRange("max_chat_life_hours"));
        }
        if self.topic_refresh_seconds < 1 {
            return Err(ConfigError::OutOfRange("topic_refresh_seconds"));
        }
        if self.max_topic_lists < 1 {
            return Err(ConfigError::OutOfRange("max_topic_lists"));
        }
        if self.chats_on_screen < 1 {
            return Err(ConfigError::OutOfRange("chats_on_screen"));
        }
        if self.max_timeout_seconds < 1
            || self.max_timeout_seconds > MAX_TIMEOUT_LIMIT.as_secs()
        {
            return Err(ConfigError::OutOfRange("max_timeout_seconds"));
        }
        if self.reaper_interval_seconds < 1 {
            return Err(ConfigError::OutOfRange("reaper_interval_seconds"));
        }
        Ok(())
    }

    /// Broker settings derived from the chat settings
    ///
    /// Buffers keep ten times what a client shows so topic statistics can
    /// look further back than the visible history.
    pub fn broker_options(&self) -> BrokerOptions {
        BrokerOptions::default()
            .with_max_buffer_size(self.chats_on_screen.saturating_mul(BUFFER_MULTIPLIER))
            .with_event_ttl(Some(Duration::from_secs(
                self.max_chat_life_hours.saturating_mul(60 * 60),
            )))
            .with_max_timeout(Duration::from_secs(self.max_timeout_seconds))
    }

    /// Load configuration from `MICROCHAT_CONFIG` (if set) and the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = match std::env::var("MICROCHAT_CONFIG") {
            Ok(path) => {
                tracing::info!("[Config] Loading configuration file {}", path);
                AppConfigBuilder::from_file(Path::new(&path))?
            }
            Err(_) => AppConfigBuilder::default(),
        };

        if let Ok(addr) = std::env::var("MICROCHAT_ADDR") {
            builder = builder.listen_addr(parse_value("MICROCHAT_ADDR", &addr)?);
        } else if let Ok(port) = std::env::var("SERVER_PORT") {
            let port: u16 = parse_value("SERVER_PORT", &port)?;
            builder = builder.listen_addr(SocketAddr::from(([0, 0, 0, 0], port)));
        }
        if let Some(hours) = env_value("MICROCHAT_MAX_CHAT_HOURS")? {
            builder = builder.max_chat_life_hours(hours);
        }
        if let Some(secs) = env_value("MICROCHAT_TOPIC_REFRESH_SECS")? {
            builder = builder.topic_refresh_seconds(secs);
        }
        if let Some(lists) = env_value("MICROCHAT_MAX_TOPIC_LISTS")? {
            builder = builder.max_topic_lists(lists);
        }
        if let Some(chats) = env_value("MICROCHAT_CHATS_ON_SCREEN")? {
            builder = builder.chats_on_screen(chats);
        }
        if let Some(secs) = env_value("MICROCHAT_MAX_TIMEOUT_SECS")? {
            builder = builder.max_timeout_seconds(secs);
        }
        if let Ok(dir) = std::env::var("MICROCHAT_STATIC_DIR") {
            builder = builder.static_dir(PathBuf::from(dir));
        }

        builder.build()
    }
}

/// Builder for AppConfig
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfigBuilder {
    listen_addr: Option<SocketAddr>,
    max_chat_life_hours: Option<u64>,
    topic_refresh_seconds: Option<u64>,
    max_topic_lists: Option<usize>,
    chats_on_screen: Option<usize>,
    max_timeout_seconds: Option<u64>,
    static_dir: Option<PathBuf>,
    reaper_interval_seconds: Option<u64>,
}

impl AppConfigBuilder {
    /// Read builder values from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    /// Parse builder values from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Set the listen address
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = Some(addr);
        self
    }

    /// Set the chat retention in hours
    pub fn max_chat_life_hours(mut self, hours: u64) -> Self {
        self.max_chat_life_hours = Some(hours);
        self
    }

    /// Set the topic board refresh interval
    pub fn topic_refresh_seconds(mut self, secs: u64) -> Self {
        self.topic_refresh_seconds = Some(secs);
        self
    }

    /// Set how many topics the boards list
    pub fn max_topic_lists(mut self, lists: usize) -> Self {
        self.max_topic_lists = Some(lists);
        self
    }

    /// Set how many chats a client shows
    pub fn chats_on_screen(mut self, chats: usize) -> Self {
        self.chats_on_screen = Some(chats);
        self
    }

    /// Set the largest accepted long-poll timeout
    pub fn max_timeout_seconds(mut self, secs: u64) -> Self {
        self.max_timeout_seconds = Some(secs);
        self
    }

    /// Serve static client assets from `dir`
    pub fn static_dir(mut self, dir: PathBuf) -> Self {
        self.static_dir = Some(dir);
        self
    }

    /// Set the expiry/reaping interval
    pub fn reaper_interval_seconds(mut self, secs: u64) -> Self {
        self.reaper_interval_seconds = Some(secs);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            listen_addr: self.listen_addr.unwrap_or(defaults.listen_addr),
            max_chat_life_hours: self.max_chat_life_hours.unwrap_or(defaults.max_chat_life_hours),
            topic_refresh_seconds: self
                .topic_refresh_seconds
                .unwrap_or(defaults.topic_refresh_seconds),
            max_topic_lists: self.max_topic_lists.unwrap_or(defaults.max_topic_lists),
            chats_on_screen: self.chats_on_screen.unwrap_or(defaults.chats_on_screen),
            max_timeout_seconds: self.max_timeout_seconds.unwrap_or(defaults.max_timeout_seconds),
            static_dir: self.static_dir.or(defaults.static_dir),
            reaper_interval_seconds: self
                .reaper_interval_seconds
                .unwrap_or(defaults.reaper_interval_seconds),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be >= 1")]
    OutOfRange(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

fn parse_value<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

fn env_value<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => parse_value(name, &value).map(Some),
        Err(_) => Ok(None),
    }
}
