//! Flat key/value settings store with JSON persistence
//!
//! Both the overlay widget and the settings editor process open the same
//! file. Writers only publish on [`SettingsStore::sync`], which merges the
//! locally changed keys over the current on-disk content and replaces the
//! file atomically, so a reader never observes a half-written file.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::store;

/// Organization/application pair scoping the settings file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub organization: String,
    pub application: String,
}

impl Namespace {
    pub fn new(organization: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            application: application.into(),
        }
    }

    /// Resolve the settings file for this namespace.
    ///
    /// `SYSMON_OVERLAY_CONFIG_DIR` replaces the `<config>/<organization>`
    /// directory when set.
    pub fn path(&self) -> PathBuf {
        let dir = match std::env::var_os(store::CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(&self.organization),
        };
        dir.join(format!("{}.json", self.application))
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(store::ORGANIZATION, store::APPLICATION)
    }
}

/// Key/value settings backed by a JSON object file
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
    pending: BTreeSet<String>,
}

impl SettingsStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = read_values(&path)?;
        debug!(path = ?path, keys = values.len(), "Opened settings store");
        Ok(Self {
            path,
            values,
            pending: BTreeSet::new(),
        })
    }

    /// Open the store, starting empty if the file is unreadable.
    ///
    /// The broken file is left in place until the next [`sync`](Self::sync).
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(store) => store,
            Err(err) => {
                warn!(error = ?err, "Failed to read settings, using defaults");
                Self {
                    path,
                    values: Map::new(),
                    pending: BTreeSet::new(),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw stored value
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Typed value, or `default` when missing or of the wrong shape
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.values.get(key) {
            Some(value) => match serde_json::from_value::<T>(value.clone()) {
                Ok(v) => v,
                Err(err) => {
                    warn!(key, error = %err, "Stored setting has unexpected type, using default");
                    default
                }
            },
            None => default,
        }
    }

    /// Set a value in memory; it becomes visible to other processes on `sync`
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize setting '{key}'"))?;
        if self.values.get(key) != Some(&value) {
            self.values.insert(key.to_string(), value);
            self.pending.insert(key.to_string());
        }
        Ok(())
    }

    /// Like [`set`](Self::set), but the key is written on the next `sync`
    /// even when it matches this store's snapshot, overriding whatever
    /// another process wrote in the meantime.
    pub fn set_forced<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize setting '{key}'"))?;
        self.values.insert(key.to_string(), value);
        self.pending.insert(key.to_string());
        Ok(())
    }

    /// Whether there are local changes not yet written
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Discard the in-memory view and re-read the file
    pub fn reload(&mut self) -> Result<()> {
        self.values = read_values(&self.path)?;
        self.pending.clear();
        debug!(path = ?self.path, "Reloaded settings store");
        Ok(())
    }

    /// Write pending keys over the current file content and pick up keys
    /// written by other processes in the meantime.
    pub fn sync(&mut self) -> Result<()> {
        let mut merged = match read_values(&self.path) {
            Ok(values) => values,
            Err(err) => {
                warn!(error = ?err, "Existing settings unreadable, overwriting");
                Map::new()
            }
        };
        for key in &self.pending {
            if let Some(value) = self.values.get(key) {
                merged.insert(key.clone(), value.clone());
            }
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let json_string = serde_json::to_string_pretty(&Value::Object(merged.clone()))
            .context("Failed to serialize settings to JSON")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json_string)
            .with_context(|| format!("Failed to write settings to {:?}", tmp_path))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace settings file {:?}", self.path))?;

        info!(path = ?self.path, keys = self.pending.len(), "Saved settings");
        self.values = merged;
        self.pending.clear();
        Ok(())
    }
}

fn read_values(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {:?}", path))?;
    if contents.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&contents)
        .with_context(|| format!("Failed to parse JSON from {:?}", path))?
    {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!(
            "Settings file {:?} must contain a JSON object, found {}",
            path,
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
