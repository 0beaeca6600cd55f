//! Browser-backed collaborators: `localStorage` snapshots and settings.

use cork_core::{BoardError, Result, Snapshot};
use cork_editor::{SettingsStore, SnapshotStore};
use web_sys::Storage;

fn local_storage() -> Option<Storage> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()?.local_storage().ok().flatten()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

/// Saves the board as JSON under one `localStorage` key.
pub struct LocalStorageSnapshots {
    storage: Storage,
    key: String,
}

impl LocalStorageSnapshots {
    /// `None` outside a browser or when storage is disabled.
    pub fn open(key: &str) -> Option<Self> {
        Some(Self {
            storage: local_storage()?,
            key: key.to_string(),
        })
    }
}

impl SnapshotStore for LocalStorageSnapshots {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        self.storage
            .set_item(&self.key, &json)
            .map_err(|_| BoardError::Unavailable("localStorage (quota exceeded?)"))
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        let raw = self
            .storage
            .get_item(&self.key)
            .map_err(|_| BoardError::Unavailable("localStorage"))?;
        raw.as_deref().map(Snapshot::from_json).transpose()
    }
}

/// Settings kept as individual `localStorage` entries.
pub struct LocalStorageSettings {
    storage: Storage,
}

impl LocalStorageSettings {
    pub fn open() -> Option<Self> {
        Some(Self {
            storage: local_storage()?,
        })
    }
}

impl SettingsStore for LocalStorageSettings {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set_setting(&mut self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            log::warn!("could not persist setting {key}");
        }
    }
}
