use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles loading, validating and saving the settings used by
/// the subtitle parser and the playback simulation.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Subtitle parsing settings
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    /// Playback simulation settings
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Subtitle parsing settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubtitleConfig {
    /// Reject input the permissive parser would silently tolerate
    #[serde(default)]
    pub strict: bool,

    /// Language picked when a movie offers several tracks (ISO code)
    #[serde(default = "default_preferred_language")]
    pub preferred_language: String,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            strict: false,
            preferred_language: default_preferred_language(),
        }
    }
}

/// Settings for the simulated playback engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// Interval between time-update notifications in milliseconds
    #[serde(default = "default_time_update_interval_ms")]
    pub time_update_interval_ms: u64,

    /// Media seconds advanced per wall-clock second
    #[serde(default = "default_playback_rate")]
    pub playback_rate: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            time_update_interval_ms: default_time_update_interval_ms(),
            playback_rate: default_playback_rate(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_preferred_language() -> String {
    "en".to_string()
}

// Browsers fire timeupdate roughly every 250ms
fn default_time_update_interval_ms() -> u64 {
    250
}

fn default_playback_rate() -> f64 {
    1.0
}

impl Config {
    /// Load a configuration file, or write and return the defaults when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.subtitles.preferred_language)?;

        if self.playback.time_update_interval_ms == 0 {
            return Err(anyhow!("Time update interval must be greater than zero"));
        }

        if !(self.playback.playback_rate.is_finite() && self.playback.playback_rate > 0.0) {
            return Err(anyhow!(
                "Playback rate must be a positive number, got {}",
                self.playback.playback_rate
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            subtitles: SubtitleConfig::default(),
            playback: PlaybackConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
