//! Named save slots for Keepsake.
//!
//! A [`SaveStore`] holds serialized saves as opaque text keyed by
//! [`SlotName`]. [`SaveGame`] sits on top of a store and turns object graphs
//! into saves and back, running the reviver on load.
//!
//! # Storage Backends
//!
//! - [`InMemorySaveStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileSaveStore`] -- one file per slot, replaced atomically on write

pub mod config;
pub mod error;
pub mod file;
pub mod game;
pub mod memory;
pub mod slot;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use file::FileSaveStore;
pub use game::SaveGame;
pub use memory::InMemorySaveStore;
pub use slot::{SlotInfo, SlotName, MAX_SLOT_LEN};
pub use traits::SaveStore;
