//! Credential and model registry storage
//!
//! The HTTP layer talks to storage through [`ConfigStore`]. [`JsonStore`] keeps
//! everything in memory and, when given a path, rewrites a JSON file after
//! every change.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BridgeError, Result};

/// A model registered for a scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub scope: String,
    pub provider: String,
    pub model_name: String,
    pub end_point: String,
    pub token_limit: u32,
    pub created_at: DateTime<Utc>,
}

/// Storage for provider credentials and the model registry
pub trait ConfigStore: Send + Sync {
    /// Save (or replace) the credential for `provider` in `scope`
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted
    fn store_credential(&self, scope: &str, provider: &str, secret: &str) -> Result<()>;

    fn fetch_credential(&self, scope: &str, provider: &str) -> Option<String>;

    /// All credentials in `scope`, keyed by provider
    fn fetch_credentials(&self, scope: &str) -> HashMap<String, String>;

    /// Register `models` served at `end_point`; existing records are updated
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted
    fn store_models(
        &self,
        scope: &str,
        provider: &str,
        end_point: &str,
        models: &[String],
        token_limit: u32,
    ) -> Result<usize>;

    fn fetch_models(&self, scope: &str) -> Vec<ModelRecord>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    /// scope -> provider -> secret
    #[serde(default)]
    credentials: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    models: Vec<ModelRecord>,
}

/// JSON-file backed [`ConfigStore`]
#[derive(Debug, Default)]
pub struct JsonStore {
    path: Option<PathBuf>,
    data: Mutex<StoreData>,
}

impl JsonStore {
    /// Store that lives only as long as the process
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or start) a store at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            parse_store(&contents).map_err(|e| {
                BridgeError::Store(format!("corrupt store at {}: {e}", path.display()))
            })?
        } else {
            StoreData::default()
        };

        Ok(Self {
            path: Some(path),
            data: Mutex::new(data),
        })
    }

    fn persist(&self, data: &StoreData) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_json(path, data)
    }
}

/// Only a JSON object is a valid store; serde would also accept `[]`.
fn parse_store(contents: &str) -> std::result::Result<StoreData, String> {
    let value: serde_json::Value = serde_json::from_str(contents).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

fn write_json(path: &Path, data: &StoreData) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(data)?)?;
    debug!(path = %path.display(), "store saved");
    Ok(())
}

impl ConfigStore for JsonStore {
    fn store_credential(&self, scope: &str, provider: &str, secret: &str) -> Result<()> {
        let mut data = self.data.lock();
        data.credentials
            .entry(scope.to_string())
            .or_default()
            .insert(provider.to_string(), secret.to_string());
        self.persist(&data)
    }

    fn fetch_credential(&self, scope: &str, provider: &str) -> Option<String> {
        self.data
            .lock()
            .credentials
            .get(scope)
            .and_then(|by_provider| by_provider.get(provider))
            .cloned()
    }

    fn fetch_credentials(&self, scope: &str) -> HashMap<String, String> {
        self.data
            .lock()
            .credentials
            .get(scope)
            .cloned()
            .unwrap_or_default()
    }

    fn store_models(
        &self,
        scope: &str,
        provider: &str,
        end_point: &str,
        models: &[String],
        token_limit: u32,
    ) -> Result<usize> {
        let mut data = self.data.lock();
        let now = Utc::now();

        for model_name in models {
            let existing = data.models.iter().position(|r| {
                r.scope == scope && r.provider == provider && r.model_name == *model_name
            });
            match existing {
                Some(index) => {
                    let record = &mut data.models[index];
                    record.end_point = end_point.to_string();
                    record.token_limit = token_limit;
                }
                None => data.models.push(ModelRecord {
                    scope: scope.to_string(),
                    provider: provider.to_string(),
                    model_name: model_name.clone(),
                    end_point: end_point.to_string(),
                    token_limit,
                    created_at: now,
                }),
            }
        }

        self.persist(&data)?;
        Ok(models.len())
    }

    fn fetch_models(&self, scope: &str) -> Vec<ModelRecord> {
        self.data
            .lock()
            .models
            .iter()
            .filter(|r| r.scope == scope)
            .cloned()
            .collect()
    }
}
