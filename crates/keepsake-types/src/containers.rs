use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};

use serde::{Serialize, Serializer};

use crate::convert::FromNode;
use crate::envelope::Envelope;
use crate::error::{TypeError, TypeResult};
use crate::node::Node;

/// Tag of the built-in ordered map container. Payload: `[[key, value], ...]`.
pub const MAP_TAG: &str = "JSONMap";
/// Tag of the built-in ordered set container. Payload: `[member, ...]`.
pub const SET_TAG: &str = "JSONSet";

/// Map with arbitrary keys that travels as a `JSONMap` envelope.
///
/// Plain JSON objects can only have string keys; this wrapper keeps typed
/// keys (numbers, instances) by saving the entries as pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveMap<K: Ord, V>(pub BTreeMap<K, V>);

impl<K: Ord, V> SaveMap<K, V> {
    /// Empty map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Unwrap into the plain `BTreeMap`.
    pub fn into_inner(self) -> BTreeMap<K, V> {
        self.0
    }
}

impl<K: Ord, V> Default for SaveMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> Deref for SaveMap<K, V> {
    type Target = BTreeMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K: Ord, V> DerefMut for SaveMap<K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Ord, V> From<BTreeMap<K, V>> for SaveMap<K, V> {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self(map)
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SaveMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<K: Ord + Serialize, V: Serialize> Serialize for SaveMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<(&K, &V)> = self.0.iter().collect();
        Envelope::new(MAP_TAG, pairs).serialize(serializer)
    }
}

impl<K: Ord + FromNode, V: FromNode> FromNode for SaveMap<K, V> {
    fn from_node(node: Node) -> TypeResult<Self> {
        match node {
            Node::Map(pairs) => pairs
                .into_iter()
                .map(|(key, value)| Ok::<_, TypeError>((K::from_node(key)?, V::from_node(value)?)))
                .collect(),
            // Maps saved before the container existed were plain objects.
            Node::Object(fields) => fields
                .into_iter()
                .map(|(key, value)| {
                    Ok::<_, TypeError>((K::from_node(Node::String(key))?, V::from_node(value)?))
                })
                .collect(),
            other => Err(TypeError::assertion("map", other.kind())),
        }
    }
}

/// Ordered set that travels as a `JSONSet` envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveSet<T: Ord>(pub BTreeSet<T>);

impl<T: Ord> SaveSet<T> {
    /// Empty set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Unwrap into the plain `BTreeSet`.
    pub fn into_inner(self) -> BTreeSet<T> {
        self.0
    }
}

impl<T: Ord> Default for SaveSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Deref for SaveSet<T> {
    type Target = BTreeSet<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Ord> DerefMut for SaveSet<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Ord> From<BTreeSet<T>> for SaveSet<T> {
    fn from(set: BTreeSet<T>) -> Self {
        Self(set)
    }
}

impl<T: Ord> FromIterator<T> for SaveSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: Ord + Serialize> Serialize for SaveSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let members: Vec<&T> = self.0.iter().collect();
        Envelope::new(SET_TAG, members).serialize(serializer)
    }
}

impl<T: Ord + FromNode> FromNode for SaveSet<T> {
    fn from_node(node: Node) -> TypeResult<Self> {
        match node {
            Node::Set(members) | Node::Array(members) => {
                members.into_iter().map(T::from_node).collect()
            }
            other => Err(TypeError::assertion("set", other.kind())),
        }
    }
}
