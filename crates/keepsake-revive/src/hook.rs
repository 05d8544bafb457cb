use keepsake_types::{Envelope, FromNode, Node, TypeError, MAP_TAG, SET_TAG};
use serde_json::Value;
use tracing::warn;

use crate::error::{RegistryError, ReviveError, ReviveResult};
use crate::legacy::CompatibilityWarning;
use crate::registry::Registry;
use crate::walk::{parse_bottom_up, walk_bottom_up, Origin};

/// Outcome of a successful load.
#[derive(Clone, Debug, PartialEq)]
pub struct Revival {
    pub root: Node,
    /// One entry per node resolved through the legacy table.
    pub warnings: Vec<CompatibilityWarning>,
}

impl Revival {
    /// Convert the revived root into a typed value.
    pub fn into_root<T: FromNode>(self) -> ReviveResult<T> {
        Ok(T::from_node(self.root)?)
    }

    /// `true` if no legacy fallbacks were needed.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Turns parsed save data into live instances.
///
/// The reviver is the per-node hook of a bottom-up walk: it sees each node
/// only after all of that node's children were revived, so a type's
/// `from_json` never meets a raw nested envelope.
#[derive(Clone, Copy, Debug)]
pub struct Reviver<'r> {
    registry: &'r Registry,
}

impl<'r> Reviver<'r> {
    /// Reviver resolving tags against `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Registry this reviver resolves against.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Parse and revive a save. Any fatal error aborts the whole load.
    ///
    /// Only objects that are envelopes in the document itself are resolved.
    /// A `ctor` that is not a literal string never names a tag, even when
    /// its own value revives to one.
    pub fn revive_str(&self, text: &str) -> ReviveResult<Revival> {
        let mut warnings = Vec::new();
        let root = parse_bottom_up(text, |node, origin| self.hook(node, origin, &mut warnings))?;
        Ok(Revival { root, warnings })
    }

    /// Revive an already-parsed document.
    pub fn revive_value(&self, value: Value) -> ReviveResult<Revival> {
        let mut warnings = Vec::new();
        let root = walk_bottom_up(value, &mut |node, origin| self.hook(node, origin, &mut warnings))?;
        Ok(Revival { root, warnings })
    }

    fn hook(
        &self,
        node: Node,
        origin: Origin,
        warnings: &mut Vec<CompatibilityWarning>,
    ) -> ReviveResult<Node> {
        match origin {
            Origin::Envelope => self.revive_node(node, warnings),
            Origin::Plain => Ok(node),
        }
    }

    /// Resolve a single node whose children are already revived.
    ///
    /// Non-envelopes pass through unchanged. Envelopes resolve against the
    /// built-in containers, then the registry, then the legacy table; a tag
    /// found nowhere is an unknown-constructor error.
    pub fn revive_node(
        &self,
        node: Node,
        warnings: &mut Vec<CompatibilityWarning>,
    ) -> ReviveResult<Node> {
        let envelope = match node.into_envelope() {
            Ok(envelope) => envelope,
            Err(node) => return Ok(node),
        };

        match envelope.tag() {
            MAP_TAG => return revive_map(envelope),
            SET_TAG => return revive_set(envelope),
            _ => {}
        }

        if let Some(entry) = self.registry.get(envelope.tag()) {
            return entry.revive(envelope).map(Node::Instance);
        }

        match self.registry.legacy().lookup(envelope.tag()) {
            Some(entry) => {
                let warning = CompatibilityWarning::new(entry);
                warn!(
                    tag = entry.tag,
                    retired_in = entry.retired_in,
                    action = ?warning.action,
                    "resolved retired tag through legacy table"
                );
                warnings.push(warning);
                Ok(entry.apply(envelope.data))
            }
            None => Err(ReviveError::UnknownConstructor {
                tag: envelope.ctor,
            }),
        }
    }
}

/// Reviver backed by the installed process-wide registry.
pub fn global_reviver() -> Result<Reviver<'static>, RegistryError> {
    Registry::global().map(Reviver::new)
}

fn revive_map(envelope: Envelope<Node>) -> ReviveResult<Node> {
    let malformed = |reason: &str| TypeError::MalformedEnvelope {
        tag: MAP_TAG.to_string(),
        reason: reason.to_string(),
    };
    let entries = match envelope.data {
        Node::Array(entries) => entries,
        other => return Err(malformed(&format!("expected array of pairs, found {}", other.kind())).into()),
    };
    let mut pairs = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Node::Array(pair) if pair.len() == 2 => {
                let mut pair = pair.into_iter();
                if let (Some(key), Some(value)) = (pair.next(), pair.next()) {
                    pairs.push((key, value));
                }
            }
            other => return Err(malformed(&format!("expected [key, value], found {}", other.kind())).into()),
        }
    }
    Ok(Node::Map(pairs))
}

fn revive_set(envelope: Envelope<Node>) -> ReviveResult<Node> {
    match envelope.data {
        Node::Array(members) => Ok(Node::Set(members)),
        other => Err(TypeError::MalformedEnvelope {
            tag: SET_TAG.to_string(),
            reason: format!("expected array, found {}", other.kind()),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::legacy::{LegacyEntry, LegacyStrategy, LegacyTable};
    use crate::testing::{self, registry, Faction, Gauge, Inner, Outer, Player};

    fn revive(text: &str) -> ReviveResult<Revival> {
        Reviver::new(&registry()).revive_str(text)
    }

    #[test]
    fn plain_json_passes_through() {
        let revival = revive(r#"{"a": [1, "x", null], "b": {"c": true}}"#).unwrap();
        assert!(revival.is_clean());
        assert_eq!(
            revival.root.to_value().unwrap(),
            json!({"a": [1, "x", null], "b": {"c": true}})
        );
    }

    #[test]
    fn malformed_envelopes_pass_through() {
        let text = r#"[{"ctor": "", "data": 1}, {"ctor": "Player"}, {"ctor": 4, "data": {}}]"#;
        let revival = revive(text).unwrap();
        assert_eq!(revival.root.to_value().unwrap(), serde_json::from_str::<Value>(text).unwrap());
    }

    #[test]
    fn ctor_reviving_to_a_string_is_not_a_tag() {
        let text = r#"{"ctor": {"ctor": "Employee", "data": "Player"}, "data": {"name": "x"}}"#;
        let revival = revive(text).unwrap();
        assert!(revival.root.instance_tag().is_none());
        assert_eq!(
            revival.root.to_value().unwrap(),
            json!({"ctor": "Player", "data": {"name": "x"}})
        );
        assert_eq!(revival.warnings.len(), 1);
        assert_eq!(revival.warnings[0].tag, "Employee");
    }

    #[test]
    fn registered_envelope_becomes_instance() {
        let revival = revive(r#"{"ctor": "Player", "data": {"name": "ada", "hp": 7}}"#).unwrap();
        let player = revival.into_root::<Player>().unwrap();
        assert_eq!(player.name, "ada");
        assert_eq!(player.hp, 7);
    }

    #[test]
    fn missing_field_takes_default() {
        let player = revive(r#"{"ctor": "Player", "data": {"name": "bo"}}"#)
            .unwrap()
            .into_root::<Player>()
            .unwrap();
        assert_eq!(player.hp, Player::default().hp);
    }

    #[test]
    fn legacy_unwrap_returns_plain_data_with_one_warning() {
        let revival = revive(r#"{"ctor": "Employee", "data": {"x": 1}}"#).unwrap();
        assert_eq!(revival.root, Node::from(json!({"x": 1})));
        assert!(revival.root.instance_tag().is_none());
        assert_eq!(revival.warnings.len(), 1);
        assert_eq!(revival.warnings[0].tag, "Employee");
    }

    #[test]
    fn nested_legacy_values_warn_once_each() {
        let text = r#"{"staff": [
            {"ctor": "Employee", "data": {"x": 1}},
            {"ctor": "Employee", "data": {"x": 2}}
        ]}"#;
        let revival = revive(text).unwrap();
        assert_eq!(revival.warnings.len(), 2);
        assert_eq!(revival.root.to_value().unwrap(), json!({"staff": [{"x": 1}, {"x": 2}]}));
    }

    #[test]
    fn legacy_migration_output_replaces_envelope() {
        fn to_faction(data: Node) -> Node {
            let name = data.get("gang").and_then(Node::as_str).unwrap_or_default().to_string();
            Node::Instance(Box::new(Faction { name, ..Default::default() }))
        }
        static TABLE: &[LegacyEntry] = &[LegacyEntry {
            tag: "Gang",
            retired_in: "1.2.0",
            note: "gangs merged into factions",
            strategy: LegacyStrategy::Migrate(to_faction),
        }];
        let registry = testing::builder().legacy_table(LegacyTable::new(TABLE)).build().unwrap();

        let revival = Reviver::new(&registry)
            .revive_str(r#"{"ctor": "Gang", "data": {"gang": "Slum Snakes"}}"#)
            .unwrap();
        assert_eq!(revival.warnings.len(), 1);
        let faction = revival.into_root::<Faction>().unwrap();
        assert_eq!(faction.name, "Slum Snakes");
    }

    #[test]
    fn unknown_tag_aborts_load() {
        let err = revive(r#"{"ctor": "NotARealType", "data": {}}"#).unwrap_err();
        assert_eq!(err, ReviveError::UnknownConstructor { tag: "NotARealType".into() });
    }

    #[test]
    fn unknown_tag_deep_inside_aborts_load() {
        let text = r#"{"ctor": "Outer", "data": {"inner": {"ctor": "Missing", "data": {}}}}"#;
        assert!(matches!(revive(text), Err(ReviveError::UnknownConstructor { .. })));
    }

    #[test]
    fn children_are_revived_before_containers() {
        testing::take_calls();
        let text = r#"{"ctor": "Outer", "data": {"inner": {"ctor": "Inner", "data": {"v": 1}}}}"#;
        let outer = revive(text).unwrap().into_root::<Outer>().unwrap();
        assert_eq!(testing::take_calls(), vec!["Inner", "Outer(live inner)"]);
        assert_eq!(outer.inner, Some(Inner { v: 1.0 }));
    }

    #[test]
    fn validation_failure_aborts_load() {
        let err = revive(r#"{"ctor": "Gauge", "data": {"v": "not-a-number"}}"#).unwrap_err();
        match err {
            ReviveError::Validation(report) => {
                assert_eq!(report.tag, "Gauge");
                assert_eq!(report.violations[0].field, "v");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn valid_instance_passes_validation() {
        let gauge = revive(r#"{"ctor": "Gauge", "data": {"v": 3}}"#)
            .unwrap()
            .into_root::<Gauge>()
            .unwrap();
        assert_eq!(gauge.v, json!(3));
    }

    #[test]
    fn non_object_payload_is_type_assertion() {
        let err = revive(r#"{"ctor": "Player", "data": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, ReviveError::TypeAssertion(_)));
    }

    #[test]
    fn containers_revive_into_map_and_set() {
        let text = r#"{
            "owned": {"ctor": "JSONMap", "data": [[1, {"ctor": "Inner", "data": {"v": 2}}]]},
            "seen": {"ctor": "JSONSet", "data": ["a", "b"]}
        }"#;
        let root = revive(text).unwrap().root;
        match root.get("owned") {
            Some(Node::Map(pairs)) => {
                assert_eq!(pairs[0].0, Node::from(1));
                assert_eq!(pairs[0].1.downcast_ref::<Inner>(), Some(&Inner { v: 2.0 }));
            }
            other => panic!("expected map, got {other:?}"),
        }
        assert_eq!(root.get("seen"), Some(&Node::Set(vec![Node::from("a"), Node::from("b")])));
    }

    #[test]
    fn malformed_container_payload_fails() {
        let err = revive(r#"{"ctor": "JSONMap", "data": [[1]]}"#).unwrap_err();
        assert!(matches!(
            err,
            ReviveError::TypeAssertion(TypeError::MalformedEnvelope { .. })
        ));
        let err = revive(r#"{"ctor": "JSONSet", "data": {}}"#).unwrap_err();
        assert!(matches!(err, ReviveError::TypeAssertion(_)));
    }

    #[test]
    fn revive_value_matches_revive_str() {
        let value = json!({"ctor": "Inner", "data": {"v": 4}});
        let from_value = Reviver::new(&registry()).revive_value(value.clone()).unwrap();
        let from_str = revive(&value.to_string()).unwrap();
        assert_eq!(from_value, from_str);
    }
}
