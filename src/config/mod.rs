//! Configuration management for lm-bridge
//!
//! Settings are layered:
//! 1. Built-in defaults (see [`AdapterConfig`])
//! 2. Settings file (`<config_dir>/lm-bridge/config.json`, or `--config`)
//! 3. Environment variables (`LM_STUDIO_ENDPOINT`, `LM_STUDIO_API_KEY`, `LM_STUDIO_MODEL`)
//! 4. CLI parameters (highest priority)

pub mod models;
pub mod settings;

use std::path::PathBuf;

pub use self::{
    models::{is_real_credential, AdapterConfig, ProviderType, NO_CREDENTIAL},
    settings::{ServerSettings, Settings},
};

/// Well-known configuration locations
pub struct Config;

impl Config {
    /// Get the configuration directory path
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lm-bridge")
    }

    /// Get the settings file path
    #[must_use]
    pub fn settings_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Default credential/model store path
    #[must_use]
    pub fn store_path() -> PathBuf {
        Self::config_dir().join("store.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        assert!(Config::settings_path().ends_with("lm-bridge/config.json"));
        assert!(Config::store_path().ends_with("lm-bridge/store.json"));
    }
}
