//! Configuration management for the assistant

use std::path::PathBuf;

use serde::Deserialize;

use crate::{Error, Result};

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Display name, used in the startup greeting
    pub name: String,

    /// Wake phrase; `None` treats every final transcript as a command
    pub wake_word: Option<String>,

    /// Wake phase timeout in milliseconds
    pub wake_timeout_ms: i64,

    /// Command phase timeout in milliseconds
    pub command_timeout_ms: i64,

    /// Reminder poll interval in seconds
    pub reminder_poll_secs: u64,

    /// Path to data directory (snapshot store)
    pub data_dir: PathBuf,

    /// Generative responder endpoint, `None` disables the fallback
    /// Set via `TRUSHNA_GENERATIVE_URL` env var
    pub generative_url: Option<String>,
}

/// On-disk TOML shape; every field optional so a partial file works
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    name: Option<String>,
    wake_word: Option<String>,
    wake_timeout_ms: Option<i64>,
    command_timeout_ms: Option<i64>,
    reminder_poll_secs: Option<u64>,
    generative_url: Option<String>,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Reads `assistant.toml` from the platform config directory when
    /// present, then applies environment overrides on top.
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed, or
    /// if a timeout value is not positive
    pub fn load() -> Result<Self> {
        let file = Self::load_file()?;

        let wake_word = std::env::var("TRUSHNA_WAKE_WORD")
            .ok()
            .or(file.wake_word)
            .or_else(|| Some("hey trushna".to_string()))
            .filter(|w| !w.trim().is_empty())
            .map(|w| w.to_lowercase());

        let generative_url = std::env::var("TRUSHNA_GENERATIVE_URL")
            .ok()
            .or(file.generative_url);

        let data_dir = std::env::var("TRUSHNA_DATA_DIR").map_or_else(
            |_| {
                directories::ProjectDirs::from("dev", "trushna", "trushna")
                    .map_or_else(|| PathBuf::from("."), |d| d.data_dir().to_path_buf())
            },
            PathBuf::from,
        );

        let config = Self {
            name: file.name.unwrap_or_else(|| "Trushna".to_string()),
            wake_word,
            wake_timeout_ms: file.wake_timeout_ms.unwrap_or(3_000),
            command_timeout_ms: file.command_timeout_ms.unwrap_or(5_000),
            reminder_poll_secs: file
                .reminder_poll_secs
                .unwrap_or(crate::reminders::POLL_INTERVAL_SECS),
            data_dir,
            generative_url,
        };

        config.validate()?;
        Ok(config)
    }

    fn load_file() -> Result<FileConfig> {
        let Some(dirs) = directories::ProjectDirs::from("dev", "trushna", "trushna") else {
            return Ok(FileConfig::default());
        };

        let path = dirs.config_dir().join("assistant.toml");
        if !path.exists() {
            return Ok(FileConfig::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let file = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), "loaded config file");
        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        if self.wake_timeout_ms <= 0 {
            return Err(Error::Config("wake_timeout_ms must be positive".to_string()));
        }
        if self.command_timeout_ms <= 0 {
            return Err(Error::Config(
                "command_timeout_ms must be positive".to_string(),
            ));
        }
        if self.reminder_poll_secs == 0 {
            return Err(Error::Config(
                "reminder_poll_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
