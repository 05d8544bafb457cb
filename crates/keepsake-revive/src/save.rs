use serde::Serialize;
use serde_json::Value;

use crate::encode;
use crate::error::{ReviveError, ReviveResult};

/// Serialize a save root. Registered values encode themselves as envelopes.
///
/// Fails on a value the save could not reload, such as a non-finite float.
pub fn to_string<T: Serialize + ?Sized>(root: &T) -> ReviveResult<String> {
    serde_json::to_string(&to_value(root)?).map_err(|e| ReviveError::Serialization(e.to_string()))
}

/// [`to_string`] with indentation.
pub fn to_string_pretty<T: Serialize + ?Sized>(root: &T) -> ReviveResult<String> {
    serde_json::to_string_pretty(&to_value(root)?).map_err(|e| ReviveError::Serialization(e.to_string()))
}

/// Encode a save root as a JSON tree.
pub fn to_value<T: Serialize + ?Sized>(root: &T) -> ReviveResult<Value> {
    encode::to_value(root).map_err(|e| ReviveError::Serialization(e.to_string()))
}
