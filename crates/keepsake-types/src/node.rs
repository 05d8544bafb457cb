use std::collections::BTreeMap;

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::containers::{MAP_TAG, SET_TAG};
use crate::envelope::{Envelope, CTOR_KEY, DATA_KEY};
use crate::error::{TypeError, TypeResult};
use crate::object::SaveObject;

/// One value of a revived object graph.
///
/// The plain variants mirror JSON. `Map` and `Set` are the revived forms of
/// the built-in container envelopes, and `Instance` holds a live registered
/// type. A `Node` serializes back to the same wire form it was revived from:
/// instances and containers re-encode as envelopes.
#[derive(Clone, Debug, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(BTreeMap<String, Node>),
    /// Ordered key/value pairs, in wire order.
    Map(Vec<(Node, Node)>),
    /// Ordered members, in wire order.
    Set(Vec<Node>),
    Instance(Box<dyn SaveObject>),
}

impl Node {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
            Node::Map(_) => "map",
            Node::Set(_) => "set",
            Node::Instance(_) => "instance",
        }
    }

    /// `true` for JSON null.
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// The string, if this is a string node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// The fields, if this is a plain object node.
    pub fn as_object(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a field of an object node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object()?.get(key)
    }

    /// Tag of the live instance, if this node holds one.
    pub fn instance_tag(&self) -> Option<&'static str> {
        match self {
            Node::Instance(object) => Some(object.tag()),
            _ => None,
        }
    }

    /// Borrow the live instance as a concrete type.
    pub fn downcast_ref<T: SaveObject>(&self) -> Option<&T> {
        match self {
            Node::Instance(object) => object.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Take the live instance out as a concrete type.
    pub fn into_instance<T: SaveObject>(self) -> TypeResult<T> {
        let expected = std::any::type_name::<T>();
        match self {
            Node::Instance(object) => {
                let found = object.tag();
                object
                    .into_any()
                    .downcast::<T>()
                    .map(|boxed| *boxed)
                    .map_err(|_| TypeError::InstanceMismatch {
                        expected: expected.to_string(),
                        found: found.to_string(),
                    })
            }
            other => Err(TypeError::assertion(
                format!("instance of {expected}"),
                other.kind(),
            )),
        }
    }

    /// Split a well-formed envelope node into its tag and payload.
    ///
    /// Returns the node unchanged when it is not a well-formed envelope.
    /// Keys besides `ctor` and `data` are discarded.
    pub fn into_envelope(self) -> Result<Envelope<Node>, Node> {
        let mut fields = match self {
            Node::Object(fields) => fields,
            other => return Err(other),
        };
        match (fields.remove(CTOR_KEY), fields.remove(DATA_KEY)) {
            (Some(Node::String(ctor)), Some(data)) if !ctor.is_empty() => Ok(Envelope { ctor, data }),
            (ctor, data) => {
                if let Some(ctor) = ctor {
                    fields.insert(CTOR_KEY.to_string(), ctor);
                }
                if let Some(data) = data {
                    fields.insert(DATA_KEY.to_string(), data);
                }
                Err(Node::Object(fields))
            }
        }
    }

    /// Encode back to plain JSON.
    pub fn to_value(&self) -> TypeResult<Value> {
        serde_json::to_value(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

impl PartialEq for Node {
    /// Structural equality; instances compare field-wise through
    /// [`SaveObject::eq_object`].
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Array(a), Node::Array(b)) | (Node::Set(a), Node::Set(b)) => a == b,
            (Node::Object(a), Node::Object(b)) => a == b,
            (Node::Map(a), Node::Map(b)) => a == b,
            (Node::Instance(a), Node::Instance(b)) => a.eq_object(&**b),
            _ => false,
        }
    }
}

impl From<Value> for Node {
    /// Plain structural conversion. Envelopes stay as object nodes; reviving
    /// them is the job of the revival hook.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Object(fields) => Node::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Box<dyn SaveObject>> for Node {
    fn from(object: Box<dyn SaveObject>) -> Self {
        Node::Instance(object)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => items.serialize(serializer),
            Node::Object(fields) => fields.serialize(serializer),
            Node::Map(pairs) => Envelope::new(MAP_TAG, pairs).serialize(serializer),
            Node::Set(items) => Envelope::new(SET_TAG, items).serialize(serializer),
            Node::Instance(object) => object
                .to_envelope()
                .map_err(S::Error::custom)?
                .serialize(serializer),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::any::Any;

    use serde_json::{json, Map};

    use super::*;

    /// Hand-written instance used by this crate's tests.
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) struct Marker {
        pub level: u32,
    }

    impl SaveObject for Marker {
        fn tag(&self) -> &'static str {
            "Marker"
        }

        fn field_view(&self) -> TypeResult<Map<String, Value>> {
            let mut fields = Map::new();
            fields.insert("level".into(), json!(self.level));
            Ok(fields)
        }

        fn to_envelope(&self) -> TypeResult<Envelope> {
            Ok(Envelope::new("Marker", Value::Object(self.field_view()?)))
        }

        fn clone_object(&self) -> Box<dyn SaveObject> {
            Box::new(self.clone())
        }

        fn eq_object(&self, other: &dyn SaveObject) -> bool {
            other.as_any().downcast_ref::<Marker>() == Some(self)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Other;

    impl SaveObject for Other {
        fn tag(&self) -> &'static str {
            "Other"
        }
        fn field_view(&self) -> TypeResult<Map<String, Value>> {
            Ok(Map::new())
        }
        fn to_envelope(&self) -> TypeResult<Envelope> {
            Ok(Envelope::new("Other", json!({})))
        }
        fn clone_object(&self) -> Box<dyn SaveObject> {
            Box::new(self.clone())
        }
        fn eq_object(&self, other: &dyn SaveObject) -> bool {
            other.as_any().is::<Other>()
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    }

    pub(crate) fn marker(level: u32) -> Node {
        Node::Instance(Box::new(Marker { level }))
    }

    #[test]
    fn from_value_keeps_structure() {
        let node = Node::from(json!({"a": [1, "two", null], "b": true}));
        let a = node.get("a").unwrap();
        assert_eq!(a.kind(), "array");
        assert_eq!(node.get("b"), Some(&Node::Bool(true)));
        assert_eq!(node.to_value().unwrap(), json!({"a": [1, "two", null], "b": true}));
    }

    #[test]
    fn into_envelope_splits_tag_and_data() {
        let node = Node::from(json!({"ctor": "Marker", "data": {"level": 2}, "stray": 1}));
        let envelope = node.into_envelope().unwrap();
        assert_eq!(envelope.tag(), "Marker");
        assert_eq!(envelope.data, Node::from(json!({"level": 2})));
    }

    #[test]
    fn into_envelope_returns_non_envelopes_unchanged() {
        for value in [
            json!({"ctor": "", "data": 1}),
            json!({"ctor": "Marker"}),
            json!({"ctor": 3, "data": 1}),
            json!([1, 2]),
            json!(5),
        ] {
            let node = Node::from(value.clone());
            let back = node.into_envelope().unwrap_err();
            assert_eq!(back, Node::from(value));
        }
    }

    #[test]
    fn instance_serializes_as_envelope() {
        let node = Node::Object(BTreeMap::from([("m".to_string(), marker(4))]));
        assert_eq!(
            node.to_value().unwrap(),
            json!({"m": {"ctor": "Marker", "data": {"level": 4}}})
        );
    }

    #[test]
    fn containers_serialize_as_envelopes() {
        let map = Node::Map(vec![(Node::from(1), Node::from("one"))]);
        assert_eq!(
            map.to_value().unwrap(),
            json!({"ctor": "JSONMap", "data": [[1, "one"]]})
        );
        let set = Node::Set(vec![Node::from("a"), Node::from("b")]);
        assert_eq!(
            set.to_value().unwrap(),
            json!({"ctor": "JSONSet", "data": ["a", "b"]})
        );
    }

    #[test]
    fn instances_compare_field_wise() {
        assert_eq!(marker(1), marker(1));
        assert_ne!(marker(1), marker(2));
        assert_ne!(marker(1), Node::Instance(Box::new(Other)));
        assert_eq!(marker(3).clone(), marker(3));
    }

    #[test]
    fn downcast_and_take_instance() {
        let node = marker(9);
        assert_eq!(node.instance_tag(), Some("Marker"));
        assert_eq!(node.downcast_ref::<Marker>(), Some(&Marker { level: 9 }));
        assert!(node.downcast_ref::<Other>().is_none());
        assert_eq!(node.into_instance::<Marker>().unwrap(), Marker { level: 9 });
    }

    #[test]
    fn take_instance_of_wrong_type_fails() {
        let err = marker(1).into_instance::<Other>().unwrap_err();
        assert!(matches!(err, TypeError::InstanceMismatch { ref found, .. } if found == "Marker"));

        let err = Node::from(json!({"level": 1})).into_instance::<Marker>().unwrap_err();
        assert!(matches!(err, TypeError::Assertion { ref found, .. } if found == "object"));
    }
}
