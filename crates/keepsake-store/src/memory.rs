use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::slot::{SlotInfo, SlotName};
use crate::traits::SaveStore;

/// In-memory save store for tests and embedding.
#[derive(Default)]
pub struct InMemorySaveStore {
    slots: RwLock<HashMap<SlotName, (String, DateTime<Utc>)>>,
}

impl InMemorySaveStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SaveStore for InMemorySaveStore {
    fn read(&self, slot: &SlotName) -> StoreResult<Option<String>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(slot).map(|(text, _)| text.clone()))
    }

    fn write(&self, slot: &SlotName, text: &str) -> StoreResult<()> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(slot.clone(), (text.to_string(), Utc::now()));
        Ok(())
    }

    fn delete(&self, slot: &SlotName) -> StoreResult<bool> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.remove(slot).is_some())
    }

    fn list(&self) -> StoreResult<Vec<SlotInfo>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut infos: Vec<SlotInfo> = slots
            .iter()
            .map(|(name, (text, modified))| SlotInfo {
                name: name.clone(),
                bytes: text.len() as u64,
                modified: Some(*modified),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }
}

impl std::fmt::Debug for InMemorySaveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySaveStore")
            .field("slot_count", &self.len())
            .finish()
    }
}
