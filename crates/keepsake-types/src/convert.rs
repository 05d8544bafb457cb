use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use serde_json::Value;

use crate::error::{TypeError, TypeResult};
use crate::node::Node;

/// Conversion from a revived [`Node`] into a typed value.
///
/// Field assignment during default reconstruction goes through this trait.
/// Registered types implement it by taking their live instance out of
/// [`Node::Instance`]; plain types accept the matching JSON shape.
pub trait FromNode: Sized {
    fn from_node(node: Node) -> TypeResult<Self>;
}

impl FromNode for Node {
    fn from_node(node: Node) -> TypeResult<Self> {
        Ok(node)
    }
}

/// Loose JSON field. Live instances are re-encoded as envelopes.
impl FromNode for Value {
    fn from_node(node: Node) -> TypeResult<Self> {
        node.to_value()
    }
}

impl FromNode for bool {
    fn from_node(node: Node) -> TypeResult<Self> {
        match node {
            Node::Bool(b) => Ok(b),
            other => Err(TypeError::assertion("bool", other.kind())),
        }
    }
}

impl FromNode for String {
    fn from_node(node: Node) -> TypeResult<Self> {
        match node {
            Node::String(s) => Ok(s),
            other => Err(TypeError::assertion("string", other.kind())),
        }
    }
}

macro_rules! impl_from_node_number {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromNode for $t {
                fn from_node(node: Node) -> TypeResult<Self> {
                    match node {
                        Node::Number(n) => serde_json::from_value(Value::Number(n.clone()))
                            .map_err(|_| TypeError::assertion(stringify!($t), format!("number {n}"))),
                        other => Err(TypeError::assertion(stringify!($t), other.kind())),
                    }
                }
            }
        )*
    };
}

impl_from_node_number!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

impl<T: FromNode> FromNode for Option<T> {
    fn from_node(node: Node) -> TypeResult<Self> {
        match node {
            Node::Null => Ok(None),
            other => T::from_node(other).map(Some),
        }
    }
}

impl<T: FromNode> FromNode for Box<T> {
    fn from_node(node: Node) -> TypeResult<Self> {
        T::from_node(node).map(Box::new)
    }
}

impl<T: FromNode> FromNode for Vec<T> {
    fn from_node(node: Node) -> TypeResult<Self> {
        match node {
            Node::Array(items) | Node::Set(items) => items.into_iter().map(T::from_node).collect(),
            other => Err(TypeError::assertion("array", other.kind())),
        }
    }
}

impl<T: FromNode + Ord> FromNode for BTreeSet<T> {
    fn from_node(node: Node) -> TypeResult<Self> {
        Vec::<T>::from_node(node).map(|items| items.into_iter().collect())
    }
}

impl<T: FromNode + Eq + Hash> FromNode for HashSet<T> {
    fn from_node(node: Node) -> TypeResult<Self> {
        Vec::<T>::from_node(node).map(|items| items.into_iter().collect())
    }
}

/// Collect string-keyed entries from a plain object or a revived map.
pub(crate) fn string_keyed<T: FromNode>(node: Node) -> TypeResult<Vec<(String, T)>> {
    match node {
        Node::Object(fields) => fields
            .into_iter()
            .map(|(key, value)| Ok::<_, TypeError>((key, T::from_node(value)?)))
            .collect(),
        Node::Map(pairs) => pairs
            .into_iter()
            .map(|(key, value)| Ok::<_, TypeError>((String::from_node(key)?, T::from_node(value)?)))
            .collect(),
        other => Err(TypeError::assertion("object", other.kind())),
    }
}

impl<T: FromNode> FromNode for BTreeMap<String, T> {
    fn from_node(node: Node) -> TypeResult<Self> {
        string_keyed(node).map(|entries| entries.into_iter().collect())
    }
}

impl<T: FromNode> FromNode for HashMap<String, T> {
    fn from_node(node: Node) -> TypeResult<Self> {
        string_keyed(node).map(|entries| entries.into_iter().collect())
    }
}
