use keepsake_schema::Schema;
use keepsake_types::{Envelope, Node, SaveObject, TypeResult};

use crate::error::ReviveResult;
use crate::generic::{generic_from_json, generic_to_json, Fields};

/// A type that can be saved under a tag and revived from it.
///
/// The defaults use the generic strategies; override `from_json` or
/// `to_json` when a type's wire form differs from its field list. Both sides
/// must agree: whatever `to_json` writes is exactly what `from_json` reads.
///
/// `from_json` runs after every envelope nested in the payload has been
/// revived, so nested registered values arrive as [`Node::Instance`].
pub trait Revive: Fields + SaveObject + Sized {
    /// The tag written into `ctor`. Must be non-empty and unique.
    const TAG: &'static str;

    /// When set, only these fields are saved and restored.
    const ALLOW_LIST: Option<&'static [&'static str]> = None;

    fn from_json(envelope: Envelope<Node>) -> ReviveResult<Self> {
        generic_from_json(envelope.data, Self::ALLOW_LIST)
    }

    fn to_json(&self) -> TypeResult<Envelope> {
        Ok(generic_to_json(Self::TAG, &self.own_fields()?, Self::ALLOW_LIST))
    }

    /// Structural checks applied to every revived instance.
    fn schema() -> Option<Schema> {
        None
    }
}
