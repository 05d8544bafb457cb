use crate::error::StoreResult;
use crate::slot::{SlotInfo, SlotName};

/// Storage for serialized saves, keyed by slot.
///
/// Backends treat saves as opaque text; revival happens in
/// [`SaveGame`](crate::SaveGame). A write replaces the slot's previous
/// content as a whole: readers see either the old save or the new one.
pub trait SaveStore: Send + Sync {
    /// Read a slot. Returns `Ok(None)` if the slot is empty.
    fn read(&self, slot: &SlotName) -> StoreResult<Option<String>>;

    fn write(&self, slot: &SlotName, text: &str) -> StoreResult<()>;

    /// Delete a slot. Returns `true` if it existed.
    fn delete(&self, slot: &SlotName) -> StoreResult<bool>;

    /// Every stored slot, sorted by name.
    fn list(&self) -> StoreResult<Vec<SlotInfo>>;

    fn exists(&self, slot: &SlotName) -> StoreResult<bool> {
        Ok(self.read(slot)?.is_some())
    }
}
