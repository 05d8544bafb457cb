use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::slot::{SlotInfo, SlotName};
use crate::traits::SaveStore;

/// Save store keeping one `<slot>.<extension>` file per slot.
///
/// Writes go to a temporary file in the same directory, are synced, then
/// renamed over the slot file, so a crash mid-write leaves the previous save
/// intact.
#[derive(Debug)]
pub struct FileSaveStore {
    config: StoreConfig,
}

impl FileSaveStore {
    /// Open a store, creating its root directory if needed.
    ///
    /// The config is validated first, so nothing is created for a bad one.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        fs::create_dir_all(&config.root)?;
        Ok(Self { config })
    }

    /// Configuration the store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Directory holding the slot files.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Path of the file backing `slot`.
    pub fn slot_path(&self, slot: &SlotName) -> PathBuf {
        self.config
            .root
            .join(format!("{}.{}", slot, self.config.extension))
    }

    /// Path of the backup kept for `slot`.
    pub fn backup_path(&self, slot: &SlotName) -> PathBuf {
        self.config
            .root
            .join(format!("{}.{}.bak", slot, self.config.extension))
    }

    fn check_size(&self, slot: &SlotName, size: u64) -> StoreResult<()> {
        if size > self.config.max_bytes {
            return Err(StoreError::TooLarge {
                slot: slot.to_string(),
                size,
                max: self.config.max_bytes,
            });
        }
        Ok(())
    }
}

impl SaveStore for FileSaveStore {
    fn read(&self, slot: &SlotName) -> StoreResult<Option<String>> {
        let path = self.slot_path(slot);
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        self.check_size(slot, metadata.len())?;
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn write(&self, slot: &SlotName, text: &str) -> StoreResult<()> {
        self.check_size(slot, text.len() as u64)?;
        let path = self.slot_path(slot);
        if self.config.keep_backup && path.exists() {
            fs::copy(&path, self.backup_path(slot))?;
        }

        let mut tmp = NamedTempFile::new_in(&self.config.root)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(slot = %slot, bytes = text.len(), path = %path.display(), "save written");
        Ok(())
    }

    fn delete(&self, slot: &SlotName) -> StoreResult<bool> {
        match fs::remove_file(self.backup_path(slot)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(slot = %slot, error = %e, "failed to remove backup"),
        }
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> StoreResult<Vec<SlotInfo>> {
        let mut infos = Vec::new();
        for entry in fs::read_dir(&self.config.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(self.config.extension.as_str()) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let Ok(name) = SlotName::new(stem) else {
                continue;
            };
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            infos.push(SlotInfo {
                name,
                bytes: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }
}
