use std::any::Any;
use std::fmt;

use serde_json::{Map, Value};

use crate::envelope::Envelope;
use crate::error::TypeResult;

/// A live, persistable instance held inside a revived graph.
///
/// This is the object-safe face of a registered type: it lets a [`Node`]
/// carry any registered value behind a `Box<dyn SaveObject>` and still
/// encode, compare, clone, and downcast it. Implementations are normally
/// generated by the `save_object!` macro in `keepsake-revive`.
///
/// [`Node`]: crate::Node
pub trait SaveObject: Any + fmt::Debug + Send + Sync {
    /// The type tag this instance is saved under.
    fn tag(&self) -> &'static str;

    /// The instance's own fields as JSON. Nested instances appear as
    /// envelopes.
    fn field_view(&self) -> TypeResult<Map<String, Value>>;

    /// Encode this instance as an envelope.
    fn to_envelope(&self) -> TypeResult<Envelope>;

    fn clone_object(&self) -> Box<dyn SaveObject>;

    /// Field-wise equality against another instance of the same concrete type.
    fn eq_object(&self, other: &dyn SaveObject) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl Clone for Box<dyn SaveObject> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}
