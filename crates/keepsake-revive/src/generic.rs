//! Default serialization and reconstruction strategies.

use keepsake_types::{Envelope, Node, TypeError, TypeResult};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{ReviveError, ReviveResult};
use crate::traits::Revive;

/// Field-level access used by the generic strategies.
///
/// Usually generated by [`save_object!`](crate::save_object).
pub trait Fields: Default {
    /// Every own field, encoded. Nested instances encode as envelopes.
    fn own_fields(&self) -> TypeResult<Map<String, Value>>;

    /// Assign one saved field onto `self`.
    ///
    /// Returns `Ok(false)` when the type has no such field and no catch-all
    /// map to keep it in.
    fn assign_field(&mut self, name: &str, value: Node) -> TypeResult<bool>;
}

/// Build an envelope from a type's fields.
///
/// With an allow-list, exactly those listed fields that exist are copied;
/// absent ones are omitted rather than defaulted. Without one, every field
/// is copied. The returned envelope owns its data, so later changes to the
/// source cannot alter it.
pub fn generic_to_json(
    tag: &str,
    fields: &Map<String, Value>,
    allow_list: Option<&[&str]>,
) -> Envelope {
    let data = match allow_list {
        Some(keys) => keys
            .iter()
            .filter_map(|key| fields.get(*key).map(|value| ((*key).to_string(), value.clone())))
            .collect(),
        None => fields.clone(),
    };
    Envelope::new(tag, Value::Object(data))
}

/// Default reconstruction: default-construct `T`, then copy fields back.
///
/// `data` must be a plain object node; anything else is a type assertion
/// failure. With an allow-list only listed fields are copied and the rest of
/// `data` is ignored. Without one every field in `data` is offered to the
/// instance, declared or not. Values are assigned as saved: no schema is
/// consulted here, only the conversion each field type requires. Fields
/// missing from `data` keep their default values.
pub fn generic_from_json<T: Revive>(data: Node, allow_list: Option<&[&str]>) -> ReviveResult<T> {
    let fields = match data {
        Node::Object(fields) => fields,
        other => {
            return Err(ReviveError::TypeAssertion(TypeError::assertion(
                format!("object payload for {}", T::TAG),
                other.kind(),
            )))
        }
    };

    let mut instance = T::default();
    for (name, value) in fields {
        if let Some(keys) = allow_list {
            if !keys.contains(&name.as_str()) {
                continue;
            }
        }
        let kept = instance
            .assign_field(&name, value)
            .map_err(|source| ReviveError::Field {
                tag: T::TAG.to_string(),
                field: name.clone(),
                source,
            })?;
        if !kept {
            trace!(tag = T::TAG, field = %name, "dropped undeclared field");
        }
    }
    Ok(instance)
}
