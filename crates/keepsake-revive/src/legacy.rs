//! Fallbacks for tags whose types no longer exist.
//!
//! Every save ever written must stay loadable, so an entry is never removed
//! or changed once released: retiring a type means appending its tag here.
//! Strategies are pure and must accept every payload the retired type could
//! have written.

use std::collections::HashSet;
use std::fmt;

use keepsake_types::Node;

use crate::error::RegistryError;

/// How a retired tag is resolved.
#[derive(Clone, Copy, Debug)]
pub enum LegacyStrategy {
    /// Keep the payload as a plain value in place of the instance.
    Unwrap,
    /// Rewrite the payload into its current form.
    Migrate(fn(Node) -> Node),
}

/// One retired tag.
#[derive(Clone, Copy, Debug)]
pub struct LegacyEntry {
    pub tag: &'static str,
    /// Release in which the type was removed or reshaped.
    pub retired_in: &'static str,
    pub note: &'static str,
    pub strategy: LegacyStrategy,
}

impl LegacyEntry {
    /// Resolve a payload saved under this tag.
    pub fn apply(&self, data: Node) -> Node {
        match self.strategy {
            LegacyStrategy::Unwrap => data,
            LegacyStrategy::Migrate(migrate) => migrate(data),
        }
    }

    /// What resolving this entry does to the payload.
    pub fn action(&self) -> LegacyAction {
        match self.strategy {
            LegacyStrategy::Unwrap => LegacyAction::Unwrapped,
            LegacyStrategy::Migrate(_) => LegacyAction::Migrated,
        }
    }
}

/// Built-in retired tags.
pub static DEFAULT_LEGACY: &[LegacyEntry] = &[LegacyEntry {
    tag: "Employee",
    retired_in: "2.0.0",
    note: "employees became aggregate division statistics; old records load as plain data",
    strategy: LegacyStrategy::Unwrap,
}];

/// Append-only lookup over a static list of retired tags.
#[derive(Clone, Copy, Debug)]
pub struct LegacyTable {
    entries: &'static [LegacyEntry],
}

impl LegacyTable {
    /// Wrap a static table. Duplicates are caught by [`check`](Self::check).
    pub const fn new(entries: &'static [LegacyEntry]) -> Self {
        Self { entries }
    }

    /// A table with no retired tags.
    pub const fn empty() -> Self {
        Self { entries: &[] }
    }

    /// Entry retiring `tag`, if any.
    pub fn lookup(&self, tag: &str) -> Option<&'static LegacyEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    /// Whether `tag` is retired here.
    pub fn contains(&self, tag: &str) -> bool {
        self.lookup(tag).is_some()
    }

    /// Every entry, in table order.
    pub fn entries(&self) -> &'static [LegacyEntry] {
        self.entries
    }

    /// Number of retired tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been retired.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fail if a tag appears twice.
    pub fn check(&self) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        for entry in self.entries {
            if !seen.insert(entry.tag) {
                return Err(RegistryError::DuplicateLegacyTag {
                    tag: entry.tag.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for LegacyTable {
    fn default() -> Self {
        Self::new(DEFAULT_LEGACY)
    }
}

/// What the legacy table did with a retired tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegacyAction {
    Unwrapped,
    Migrated,
}

/// Recoverable notice that a load went through the legacy table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompatibilityWarning {
    pub tag: String,
    pub retired_in: &'static str,
    pub action: LegacyAction,
}

impl CompatibilityWarning {
    /// Warning for one resolution through `entry`.
    pub fn new(entry: &LegacyEntry) -> Self {
        Self {
            tag: entry.tag.to_string(),
            retired_in: entry.retired_in,
            action: entry.action(),
        }
    }
}

impl fmt::Display for CompatibilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.action {
            LegacyAction::Unwrapped => "unwrapped to plain data",
            LegacyAction::Migrated => "migrated",
        };
        write!(f, "{} (retired in {}) {verb}", self.tag, self.retired_in)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rename_hits(data: Node) -> Node {
        match data {
            Node::Object(mut fields) => {
                if let Some(hits) = fields.remove("hits") {
                    fields.insert("health".into(), hits);
                }
                Node::Object(fields)
            }
            other => other,
        }
    }

    static TABLE: &[LegacyEntry] = &[
        LegacyEntry {
            tag: "OldFoe",
            retired_in: "1.4.0",
            note: "hits renamed to health",
            strategy: LegacyStrategy::Migrate(rename_hits),
        },
        LegacyEntry {
            tag: "Employee",
            retired_in: "2.0.0",
            note: "",
            strategy: LegacyStrategy::Unwrap,
        },
    ];

    static DUPLICATED: &[LegacyEntry] = &[
        LegacyEntry {
            tag: "Twice",
            retired_in: "1.0.0",
            note: "",
            strategy: LegacyStrategy::Unwrap,
        },
        LegacyEntry {
            tag: "Twice",
            retired_in: "1.1.0",
            note: "",
            strategy: LegacyStrategy::Unwrap,
        },
    ];

    #[test]
    fn default_table_unwraps_employee() {
        let table = LegacyTable::default();
        let entry = table.lookup("Employee").unwrap();
        let data = Node::from(json!({"x": 1}));
        assert_eq!(entry.apply(data.clone()), data);
        assert_eq!(entry.action(), LegacyAction::Unwrapped);
        assert!(table.check().is_ok());
    }

    #[test]
    fn migration_rewrites_payload() {
        let table = LegacyTable::new(TABLE);
        let entry = table.lookup("OldFoe").unwrap();
        let migrated = entry.apply(Node::from(json!({"hits": 4})));
        assert_eq!(migrated, Node::from(json!({"health": 4})));
        assert_eq!(entry.action(), LegacyAction::Migrated);
    }

    #[test]
    fn unknown_tag_has_no_entry() {
        assert!(LegacyTable::default().lookup("NotARealType").is_none());
        assert!(LegacyTable::empty().is_empty());
    }

    #[test]
    fn duplicate_tags_are_rejected() {
        let err = LegacyTable::new(DUPLICATED).check().unwrap_err();
        assert_eq!(err, RegistryError::DuplicateLegacyTag { tag: "Twice".into() });
    }

    #[test]
    fn warning_display() {
        let warning = CompatibilityWarning::new(LegacyTable::default().lookup("Employee").unwrap());
        assert_eq!(warning.to_string(), "Employee (retired in 2.0.0) unwrapped to plain data");
    }
}
