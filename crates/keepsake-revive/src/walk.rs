use std::collections::BTreeMap;

use keepsake_types::{Envelope, Node};
use serde_json::Value;

use crate::error::{ReviveError, ReviveResult};

/// Shape of a node in the parsed document, before its children were hooked.
///
/// A hook can rewrite a child into something else, for example a `ctor`
/// object into a string. Only the document decides what is an envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// An object with a non-empty string `ctor` and a `data` key.
    Envelope,
    Plain,
}

impl Origin {
    fn of(value: &Value) -> Self {
        if Envelope::peek_tag(value).is_some() {
            Origin::Envelope
        } else {
            Origin::Plain
        }
    }
}

/// Parse JSON text, calling `hook` once per node in post-order.
///
/// Every child is passed through the hook before its parent, and the parent
/// is built from the hooked children. The root is visited last. The first
/// error stops the walk.
pub fn parse_bottom_up<F>(text: &str, mut hook: F) -> ReviveResult<Node>
where
    F: FnMut(Node, Origin) -> ReviveResult<Node>,
{
    let value: Value = serde_json::from_str(text).map_err(|e| ReviveError::Parse(e.to_string()))?;
    walk_bottom_up(value, &mut hook)
}

/// Post-order walk over an already-parsed document.
pub fn walk_bottom_up<F>(value: Value, hook: &mut F) -> ReviveResult<Node>
where
    F: FnMut(Node, Origin) -> ReviveResult<Node>,
{
    let origin = Origin::of(&value);
    let node = match value {
        Value::Array(items) => Node::Array(
            items
                .into_iter()
                .map(|item| walk_bottom_up(item, hook))
                .collect::<ReviveResult<_>>()?,
        ),
        Value::Object(fields) => {
            let mut children = BTreeMap::new();
            for (key, child) in fields {
                children.insert(key, walk_bottom_up(child, hook)?);
            }
            Node::Object(children)
        }
        scalar => Node::from(scalar),
    };
    hook(node, origin)
}
