//! Configuration management for text-finder
//!
//! Settings are loaded from environment variables with defaults. Command-line
//! flags and job files override them (flags take precedence over job files).
//!
//! # Environment Variables
//!
//! - `TEXT_FINDER_WORKSPACE`: Workspace directory - default: "."
//! - `TEXT_FINDER_CONSOLE_LOG`: Console log of the build - default: unset
//! - `TEXT_FINDER_LOG_LEVEL`: Logging level - default: "info"
//! - `TEXT_FINDER_LOG_JSON`: JSON log output (true|false) - default: "false"
//! - `TEXT_FINDER_MAX_REPORTED_MATCHES`: Matches kept per finder in reports - default: "1000"
//! - `TEXT_FINDER_FOLLOW_LINKS`: Follow symlinks while scanning file sets - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use text_finder::TextFinderConfig;
//!
//! let config = TextFinderConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use crate::publisher::PublisherOptions;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_WORKSPACE: &str = "TEXT_FINDER_WORKSPACE";
pub const ENV_CONSOLE_LOG: &str = "TEXT_FINDER_CONSOLE_LOG";
pub const ENV_LOG_LEVEL: &str = "TEXT_FINDER_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "TEXT_FINDER_LOG_JSON";
pub const ENV_MAX_REPORTED_MATCHES: &str = "TEXT_FINDER_MAX_REPORTED_MATCHES";
pub const ENV_FOLLOW_LINKS: &str = "TEXT_FINDER_FOLLOW_LINKS";

const DEFAULT_WORKSPACE: &str = ".";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_REPORTED_MATCHES: usize = 1000;
const MAX_REPORTED_MATCHES_LIMIT: usize = 100_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct TextFinderConfig {
    pub workspace: PathBuf,
    pub console_log: Option<PathBuf>,
    pub log_level: String,
    pub log_json: bool,
    pub max_reported_matches: usize,
    pub follow_links: bool,
}

impl Default for TextFinderConfig {
    /// Loads the configuration from `TEXT_FINDER_*` environment variables
    ///
    /// Unparseable values fall back to their defaults; use [`TextFinderConfig::from_env`]
    /// to surface them as errors instead.
    fn default() -> Self {
        let workspace = env::var(ENV_WORKSPACE)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE));

        let console_log = env::var(ENV_CONSOLE_LOG)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let log_level = env::var(ENV_LOG_LEVEL)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        let log_json = env::var(ENV_LOG_JSON)
            .ok()
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(false);

        let max_reported_matches = env::var(ENV_MAX_REPORTED_MATCHES)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_REPORTED_MATCHES);

        let follow_links = env::var(ENV_FOLLOW_LINKS)
            .ok()
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            workspace,
            console_log,
            log_level,
            log_json,
            max_reported_matches,
            follow_links,
        }
    }
}

impl TextFinderConfig {
    /// Loads the configuration, rejecting values that do not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(max) = parse_env::<usize>(ENV_MAX_REPORTED_MATCHES)? {
            config.max_reported_matches = max;
        }
        if let Some(json) = parse_env::<bool>(ENV_LOG_JSON)? {
            config.log_json = json;
        }
        if let Some(follow) = parse_env::<bool>(ENV_FOLLOW_LINKS)? {
            config.follow_links = follow;
        }
        Ok(config)
    }

    /// Checks value ranges and the log level
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_reported_matches == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max reported matches must be at least 1".to_string(),
            ));
        }
        if self.max_reported_matches > MAX_REPORTED_MATCHES_LIMIT {
            return Err(ConfigError::ValidationFailed(format!(
                "Max reported matches cannot exceed {}",
                MAX_REPORTED_MATCHES_LIMIT
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn publisher_options(&self) -> PublisherOptions {
        PublisherOptions {
            max_reported_matches: self.max_reported_matches,
            follow_links: self.follow_links,
        }
    }

    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        map.insert(
            "workspace".to_string(),
            self.workspace.display().to_string(),
        );
        if let Some(ref log) = self.console_log {
            map.insert("console_log".to_string(), log.display().to_string());
        }
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("log_json".to_string(), self.log_json.to_string());
        map.insert(
            "max_reported_matches".to_string(),
            self.max_reported_matches.to_string(),
        );
        map.insert("follow_links".to_string(), self.follow_links.to_string());

        map
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: format!("'{}': {}", value, e),
            }),
        Err(_) => Ok(None),
    }
}

impl fmt::Display for TextFinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Text Finder Configuration:")?;
        writeln!(f, "  Workspace: {}", self.workspace.display())?;
        if let Some(ref log) = self.console_log {
            writeln!(f, "  Console Log: {}", log.display())?;
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        writeln!(f, "  Max Reported Matches: {}", self.max_reported_matches)?;
        writeln!(f, "  Follow Links: {}", self.follow_links)?;
        Ok(())
    }
}
