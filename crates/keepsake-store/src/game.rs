use keepsake_revive::{census, Registry, Revival, Reviver, ReviveError, TagCensus};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::file::FileSaveStore;
use crate::slot::SlotName;
use crate::traits::SaveStore;

/// Saves and loads whole object graphs through a [`SaveStore`].
#[derive(Debug)]
pub struct SaveGame<S> {
    store: S,
    pretty: bool,
    max_bytes: u64,
}

impl SaveGame<FileSaveStore> {
    /// File-backed saves configured by `config`.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let pretty = config.pretty;
        let max_bytes = config.max_bytes;
        Ok(Self {
            store: FileSaveStore::open(config)?,
            pretty,
            max_bytes,
        })
    }
}

impl<S: SaveStore> SaveGame<S> {
    /// Wrap a store with the default output settings.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &StoreConfig::default())
    }

    /// Wrap a store, taking `pretty` and `max_bytes` from `config`.
    pub fn with_config(store: S, config: &StoreConfig) -> Self {
        Self {
            store,
            pretty: config.pretty,
            max_bytes: config.max_bytes,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Serialize `root` and write it to `slot`, replacing any previous save.
    pub fn save<T: Serialize + ?Sized>(&self, slot: &SlotName, root: &T) -> StoreResult<()> {
        let text = if self.pretty {
            keepsake_revive::to_string_pretty(root)?
        } else {
            keepsake_revive::to_string(root)?
        };
        self.check_size(slot, &text)?;
        self.store.write(slot, &text)?;
        debug!(slot = %slot, bytes = text.len(), "saved");
        Ok(())
    }

    /// Read and revive `slot`.
    ///
    /// Either the whole graph is returned or an error; a failure anywhere in
    /// the document discards everything revived before it.
    pub fn load(&self, slot: &SlotName, registry: &Registry) -> StoreResult<Revival> {
        let text = self.read_text(slot)?;
        let revival = Reviver::new(registry).revive_str(&text)?;
        if !revival.is_clean() {
            info!(slot = %slot, warnings = revival.warnings.len(), "loaded through legacy table");
        }
        Ok(revival)
    }

    /// Tag census of `slot` without reviving it.
    pub fn inspect(&self, slot: &SlotName) -> StoreResult<TagCensus> {
        let text = self.read_text(slot)?;
        let value = serde_json::from_str(&text).map_err(|e| ReviveError::Parse(e.to_string()))?;
        Ok(census(&value))
    }

    fn read_text(&self, slot: &SlotName) -> StoreResult<String> {
        let text = self
            .store
            .read(slot)?
            .ok_or_else(|| StoreError::NotFound(slot.to_string()))?;
        self.check_size(slot, &text)?;
        Ok(text)
    }

    fn check_size(&self, slot: &SlotName, text: &str) -> StoreResult<()> {
        let size = text.len() as u64;
        if size > self.max_bytes {
            return Err(StoreError::TooLarge {
                slot: slot.to_string(),
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}
