use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Hostnames allowed to play lessons. Empty disables the restriction.
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,

    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f64,

    #[serde(default = "default_resume_tail_secs")]
    pub resume_tail_secs: f64,

    #[serde(default = "default_seek_step_secs")]
    pub seek_step_secs: f64,

    #[serde(default = "default_volume_step")]
    pub volume_step: u8,

    #[serde(default = "default_click_debounce_ms")]
    pub click_debounce_ms: u64,

    #[serde(default = "default_notice_duration_ms")]
    pub notice_duration_ms: u64,

    #[serde(default = "default_controls_hide_delay_ms")]
    pub controls_hide_delay_ms: u64,

    #[serde(default = "default_readiness_poll_ms")]
    pub readiness_poll_ms: u64,

    #[serde(default = "default_embed_host")]
    pub embed_host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Progress file location; defaults to the user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            let contents = fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config = Self::from_toml(&contents)?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", config_path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("lesson-player").join("config.toml"))
    }
}

impl PlayerConfig {
    /// A host is blocked only when the allow-list is non-empty and does not
    /// contain it. An unknown hostname is never blocked.
    pub fn blocks_host(&self, hostname: Option<&str>) -> bool {
        let Some(hostname) = hostname else {
            return false;
        };
        !self.allowed_domains.is_empty()
            && !self
                .allowed_domains
                .iter()
                .any(|domain| domain.eq_ignore_ascii_case(hostname))
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }

    pub fn click_debounce(&self) -> Duration {
        Duration::from_millis(self.click_debounce_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }

    pub fn readiness_poll(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_ms.max(1))
    }
}

impl StorageConfig {
    pub fn progress_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().context("Failed to get data directory")?;
        Ok(data_dir.join("lesson-player").join("progress.json"))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            allowed_domains: default_allowed_domains(),
            progress_interval_ms: default_progress_interval_ms(),
            completion_threshold: default_completion_threshold(),
            resume_tail_secs: default_resume_tail_secs(),
            seek_step_secs: default_seek_step_secs(),
            volume_step: default_volume_step(),
            click_debounce_ms: default_click_debounce_ms(),
            notice_duration_ms: default_notice_duration_ms(),
            controls_hide_delay_ms: default_controls_hide_delay_ms(),
            readiness_poll_ms: default_readiness_poll_ms(),
            embed_host: default_embed_host(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            path: None,
        }
    }
}

// Default value functions
fn default_allowed_domains() -> Vec<String> {
    DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect()
}
fn default_progress_interval_ms() -> u64 { PROGRESS_INTERVAL_MS }
fn default_completion_threshold() -> f64 { COMPLETION_THRESHOLD }
fn default_resume_tail_secs() -> f64 { RESUME_TAIL_SECS }
fn default_seek_step_secs() -> f64 { SEEK_STEP_SECS }
fn default_volume_step() -> u8 { VOLUME_STEP }
fn default_click_debounce_ms() -> u64 { CLICK_DEBOUNCE_MS }
fn default_notice_duration_ms() -> u64 { SHIELD_NOTICE_MS }
fn default_controls_hide_delay_ms() -> u64 { CONTROLS_HIDE_DELAY_MS }
fn default_readiness_poll_ms() -> u64 { READINESS_POLL_MS }
fn default_embed_host() -> String { EMBED_HOST.to_string() }
fn default_key_prefix() -> String { PROGRESS_KEY_PREFIX.to_string() }
