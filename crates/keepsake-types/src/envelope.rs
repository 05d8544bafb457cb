use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key holding the type tag of an envelope.
pub const CTOR_KEY: &str = "ctor";
/// Key holding the payload of an envelope.
pub const DATA_KEY: &str = "data";

/// Type-tagged wire wrapper around a serialized value.
///
/// The tag names the reconstruction strategy; `data` is arbitrary JSON and
/// may itself contain further envelopes. An envelope is well-formed only when
/// the tag is a non-empty string and the `data` key is present (a `null`
/// payload counts as present). Envelopes never outlive a load: the revival
/// hook replaces each one with the value it describes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub ctor: String,
    pub data: T,
}

impl<T> Envelope<T> {
    /// Envelope tagged `ctor` around `data`.
    pub fn new(ctor: impl Into<String>, data: T) -> Self {
        Self {
            ctor: ctor.into(),
            data,
        }
    }

    /// The type tag.
    pub fn tag(&self) -> &str {
        &self.ctor
    }

    /// Transform the payload, keeping the tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            ctor: self.ctor,
            data: f(self.data),
        }
    }
}

impl Envelope<Value> {
    /// Returns the tag if `value` is shaped like a well-formed envelope.
    pub fn peek_tag(value: &Value) -> Option<&str> {
        let object = value.as_object()?;
        let tag = object.get(CTOR_KEY)?.as_str()?;
        if tag.is_empty() || !object.contains_key(DATA_KEY) {
            return None;
        }
        Some(tag)
    }

    /// Render as a JSON object.
    pub fn into_value(self) -> Value {
        let mut object = serde_json::Map::new();
        object.insert(CTOR_KEY.to_string(), Value::String(self.ctor));
        object.insert(DATA_KEY.to_string(), self.data);
        Value::Object(object)
    }
}
