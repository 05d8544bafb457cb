use keepsake_types::{Envelope, MAP_TAG, SET_TAG};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structural shape a field value must have.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Any,
    Null,
    Bool,
    Number,
    /// A number with no fractional part.
    Integer,
    String,
    Array,
    /// A plain object (not an envelope).
    Object,
    /// An encoded instance with the given tag.
    Instance(String),
    Map,
    Set,
    /// Matches if any of the listed shapes match.
    OneOf(Vec<Shape>),
}

impl Shape {
    /// Shape of an envelope tagged `tag`.
    pub fn instance(tag: impl Into<String>) -> Self {
        Self::Instance(tag.into())
    }

    /// Whether the encoded `value` has this shape.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Shape::Any => true,
            Shape::Null => value.is_null(),
            Shape::Bool => value.is_boolean(),
            Shape::Number => value.is_number(),
            Shape::Integer => value.is_i64() || value.is_u64(),
            Shape::String => value.is_string(),
            Shape::Array => value.is_array(),
            Shape::Object => value.is_object() && Envelope::peek_tag(value).is_none(),
            Shape::Instance(tag) => Envelope::peek_tag(value) == Some(tag.as_str()),
            Shape::Map => Envelope::peek_tag(value) == Some(MAP_TAG),
            Shape::Set => Envelope::peek_tag(value) == Some(SET_TAG),
            Shape::OneOf(shapes) => shapes.iter().any(|shape| shape.matches(value)),
        }
    }

    /// Whether `null` satisfies this shape.
    pub fn accepts_null(&self) -> bool {
        self.matches(&Value::Null)
    }
}

/// Human-readable description of a value's shape.
pub fn describe(value: &Value) -> String {
    if let Some(tag) = Envelope::peek_tag(value) {
        return format!("instance of {tag}");
    }
    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "bool".into(),
        Value::Number(n) if n.is_f64() => "number".into(),
        Value::Number(_) => "integer".into(),
        Value::String(_) => "string".into(),
        Value::Array(_) => "array".into(),
        Value::Object(_) => "object".into(),
    }
}
