//! Revival machinery for Keepsake saves.
//!
//! Saving is plain serialization: every registered type serializes to its
//! own envelope, so nested values save themselves. Loading runs a bottom-up
//! walk over the parsed document and resolves each envelope, children first,
//! against the frozen [`Registry`]. Tags that are no longer registered fall
//! back to the append-only [`LegacyTable`]; anything else aborts the load.
//!
//! # Registering a type
//!
//! Implement [`Revive`] (tag, optional allow-list, optional schema) and call
//! [`save_object!`] to generate the field plumbing. Then register the type
//! with a [`RegistryBuilder`] and either install the result process-wide or
//! hand it to a [`Reviver`].
//!
//! # Design Rules
//!
//! 1. The registry is built once and never mutated afterwards.
//! 2. Legacy entries are never removed or changed once released.
//! 3. Reconstruction copies fields without checking them; validation is a
//!    separate step driven by each type's schema.
//! 4. A load either yields the whole graph or an error, never a partial one.

pub mod census;
pub mod encode;
pub mod error;
pub mod generic;
pub mod hook;
pub mod legacy;
mod macros;
pub mod registry;
pub mod save;
pub mod traits;
pub mod walk;

#[cfg(test)]
mod testing;

pub use keepsake_schema::{Schema, Shape, ValidationReport};
pub use keepsake_types::{
    Envelope, FromNode, Node, SaveMap, SaveObject, SaveSet, TypeError, TypeResult, MAP_TAG, SET_TAG,
};

pub use census::{census, MalformedEnvelope, TagCensus, TagReport, TagStatus};
pub use encode::EncodeError;
pub use error::{RegistryError, ReviveError, ReviveResult};
pub use generic::{generic_from_json, generic_to_json, Fields};
pub use hook::{global_reviver, Revival, Reviver};
pub use legacy::{
    CompatibilityWarning, LegacyAction, LegacyEntry, LegacyStrategy, LegacyTable, DEFAULT_LEGACY,
};
pub use registry::{Registry, RegistryBuilder, RegistryEntry, ReviveFn};
pub use save::{to_string, to_string_pretty, to_value};
pub use traits::Revive;
pub use walk::{parse_bottom_up, walk_bottom_up, Origin};

#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;

    use keepsake_types::{TypeError, TypeResult};

    pub fn encode_field<T: serde::Serialize + ?Sized>(value: &T) -> TypeResult<serde_json::Value> {
        crate::encode::to_value(value).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}
