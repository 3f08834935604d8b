//! Named configuration presets
//!
//! Presets are stored as one JSON object mapping preset name to a
//! [`SheetConfig`] snapshot. The engine does not interpret them beyond
//! handing the stored config back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::SheetConfig;
use crate::export::write_atomically;
use crate::types::*;

/// A preset file on disk
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
    presets: BTreeMap<String, SheetConfig>,
}

impl PresetStore {
    /// Open a preset file. A missing file is an empty store.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();

        let presets = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                SheetError::Preset(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, presets })
    }

    /// Write the store back to its file
    pub async fn save(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.presets)
            .map_err(|e| SheetError::Preset(format!("Failed to serialize presets: {}", e)))?;
        write_atomically(&self.path, &json).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&SheetConfig> {
        self.presets.get(name)
    }

    /// Store a config under `name`, replacing any existing preset
    pub fn insert(&mut self, name: impl Into<String>, config: SheetConfig) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SheetError::Preset("Preset name must not be empty".to_string()));
        }
        self.presets.insert(name, config);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<SheetConfig> {
        self.presets.remove(name)
    }

    /// Preset names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
