//! Settings file and environment overrides

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::AdapterConfig;
use crate::error::{BridgeError, Result};

/// Top-level settings (stored in `<config_dir>/lm-bridge/config.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// LM Studio adapter parameters
    #[serde(default)]
    pub lm_studio: AdapterConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Credential/model store file; in-memory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,

    /// Scope (organisation) under which credentials and models are stored
    pub scope: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8001,
            scope: "default".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default location and apply env overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or is invalid
    pub fn load() -> Result<Self> {
        let path = super::Config::settings_path();
        Self::load_with_env(&path)
    }

    /// Load settings from `path`, then apply `LM_STUDIO_*` env overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or is invalid
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut settings = Self::load_from_path(path)?;
        settings.apply_env(|key| std::env::var(key).ok());
        settings.lm_studio.validate()?;
        Ok(settings)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save configuration to a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Override adapter fields from the environment.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a closure.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("LM_STUDIO_ENDPOINT") {
            self.lm_studio.endpoint = endpoint;
        }
        if let Some(api_key) = lookup("LM_STUDIO_API_KEY") {
            self.lm_studio.api_key = api_key;
        }
        if let Some(model) = lookup("LM_STUDIO_MODEL") {
            self.lm_studio.model = Some(model);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8001);
        assert_eq!(settings.server.scope, "default");
        assert!(settings.store_path.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Settings::load_from_path(&temp_dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_save_and_load_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let mut settings = Settings::default();
        settings.lm_studio.model = Some("mistral-7b-instruct".into());
        settings.server.port = 9100;

        settings.save_to_path(&path).unwrap();

        let loaded = Settings::load_from_path(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_parse_error_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_from_path(&path).unwrap_err();
        assert!(matches!(err, BridgeError::ConfigParse { path: p, .. } if p == path));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("LM_STUDIO_ENDPOINT", "10.1.1.1:1234"),
            ("LM_STUDIO_MODEL", "qwen3-8b"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(settings.lm_studio.endpoint, "10.1.1.1:1234");
        assert_eq!(settings.lm_studio.model.as_deref(), Some("qwen3-8b"));
        assert_eq!(settings.lm_studio.api_key, "EMPTY");
    }

    #[test]
    fn test_invalid_file_rejected_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"lm_studio": {"top_p": 4.0}}"#).unwrap();

        let err = Settings::load_with_env(&path).unwrap_err();
        assert!(matches!(err, BridgeError::ConfigValidation(_)));
    }
}
