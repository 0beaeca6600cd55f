//! External collaborators: the media library, the key/value settings store
//! and snapshot persistence. The board reaches them only through these
//! traits; in-memory implementations back tests and headless hosts.

use cork_core::{BoardConfig, Result, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An importable item from the user's media collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntity {
    pub reference_id: String,
    pub title: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub release_year: Option<u16>,
}

impl LibraryEntity {
    pub fn new(reference_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            reference_id: reference_id.into(),
            title: title.into(),
            poster_url: None,
            release_year: None,
        }
    }
}

pub trait Library {
    fn list_entities(&self) -> Vec<LibraryEntity>;
}

pub trait SettingsStore {
    fn get_setting(&self, key: &str) -> Option<String>;
    fn set_setting(&mut self, key: &str, value: &str);
}

/// Where saved boards go. The host decides the medium.
pub trait SnapshotStore {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;
    fn load(&self) -> Result<Option<Snapshot>>;
}

/// Read a `BoardConfig` from a settings store.
pub fn config_from_settings(settings: &dyn SettingsStore) -> BoardConfig {
    BoardConfig::from_settings(|key| settings.get_setting(key))
}

// ─── In-memory implementations ───────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemoryLibrary {
    pub entities: Vec<LibraryEntity>,
}

impl MemoryLibrary {
    pub fn new(entities: Vec<LibraryEntity>) -> Self {
        Self { entities }
    }
}

impl Library for MemoryLibrary {
    fn list_entities(&self) -> Vec<LibraryEntity> {
        self.entities.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl SettingsStore for MemorySettings {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_setting(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Keeps the last saved snapshot as JSON, like a browser-local store would.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshots {
    saved: Option<String>,
}

impl MemorySnapshots {
    pub fn raw(&self) -> Option<&str> {
        self.saved.as_deref()
    }
}

impl SnapshotStore for MemorySnapshots {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.saved = Some(snapshot.to_json()?);
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        self.saved.as_deref().map(Snapshot::from_json).transpose()
    }
}
