use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ValetError};

/// Top-level configuration for the valet shell.
///
/// Loaded from `~/.valet/config.toml` by default. Each section corresponds
/// to one bounded context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValetConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ValetConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ValetConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ValetError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the history file and export artifacts.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.valet".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Remote agent endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the agent service.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7777".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Greeting message shown when a conversation starts.
    pub greeting: String,
    /// Whether assistant replies are spoken aloud when a synthesizer is
    /// available.
    pub voice_enabled: bool,
    /// Duration of the avatar reaction pulse in milliseconds.
    pub reaction_pulse_ms: u64,
    /// Duration of the speaking indicator pulse in milliseconds.
    pub speaking_pulse_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: crate::types::DEFAULT_GREETING.to_string(),
            voice_enabled: false,
            reaction_pulse_ms: 820,
            speaking_pulse_ms: 900,
        }
    }
}

/// Telemetry polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Seconds between telemetry polls.
    pub poll_interval_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
