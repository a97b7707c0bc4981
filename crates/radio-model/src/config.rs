use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;
use crate::protocol::Volume;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Volume the controller starts with.  Clamped to `[0.0, 1.0]`.
    #[serde(default = "default_volume")]
    pub default_volume: f32,
    /// Upper bound on opening a stream (spawn + connect + load).
    #[serde(default = "default_open_timeout_secs")]
    pub open_timeout_secs: u64,
    /// Explicit mpv binary.  When unset, beside-exe then PATH is searched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpv_binary: Option<PathBuf>,
    /// Skip the beside-exe lookup and only search PATH.
    #[serde(default)]
    pub use_system_deps: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Volume change per key press.
    #[serde(default = "default_volume_step")]
    pub volume_step: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            open_timeout_secs: default_open_timeout_secs(),
            mpv_binary: None,
            use_system_deps: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            volume_step: default_volume_step(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            log_file: default_log_file(),
        }
    }
}

impl PlayerConfig {
    pub fn initial_volume(&self) -> Volume {
        Volume::new(self.default_volume)
    }

    pub fn open_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.open_timeout_secs.max(1))
    }
}

fn default_volume() -> f32 {
    1.0
}

fn default_open_timeout_secs() -> u64 {
    15
}

fn default_volume_step() -> f32 {
    0.05
}

fn default_log_filter() -> String {
    "info,radio_player=debug".to_string()
}

fn default_log_file() -> PathBuf {
    platform::data_dir().join("basic-radio.log")
}

impl Config {
    /// Load `config.toml`, writing the defaults out on first run.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
