use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use keepsake_schema::Schema;
use keepsake_types::{Envelope, Node, SaveObject, MAP_TAG, SET_TAG};
use tracing::debug;

use crate::error::{RegistryError, ReviveError, ReviveResult};
use crate::legacy::LegacyTable;
use crate::traits::Revive;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Type-erased reconstruction routine stored per tag.
pub type ReviveFn = fn(Envelope<Node>) -> ReviveResult<Box<dyn SaveObject>>;

fn revive_boxed<T: Revive>(envelope: Envelope<Node>) -> ReviveResult<Box<dyn SaveObject>> {
    Ok(Box::new(T::from_json(envelope)?))
}

/// Reconstruction capability registered for one tag.
#[derive(Clone)]
pub struct RegistryEntry {
    tag: &'static str,
    type_name: &'static str,
    revive: ReviveFn,
    allow_list: Option<&'static [&'static str]>,
    schema: Option<Schema>,
}

impl RegistryEntry {
    fn of<T: Revive>() -> Self {
        Self {
            tag: T::TAG,
            type_name: std::any::type_name::<T>(),
            revive: revive_boxed::<T>,
            allow_list: T::ALLOW_LIST,
            schema: T::schema(),
        }
    }

    /// Tag this entry revives.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Rust type name of the registered type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Schema checked after each reconstruction, if any.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Rebuild an instance and, if the type declares a schema, check it.
    ///
    /// The schema sees the fields the type saves and restores, so an
    /// allow-list hides the rest from it.
    pub fn revive(&self, envelope: Envelope<Node>) -> ReviveResult<Box<dyn SaveObject>> {
        let object = (self.revive)(envelope)?;
        if let Some(schema) = &self.schema {
            let mut fields = object.field_view()?;
            if let Some(allowed) = self.allow_list {
                fields.retain(|name, _| allowed.contains(&name.as_str()));
            }
            let report = schema.validate(self.tag, &fields);
            if !report.is_valid() {
                return Err(ReviveError::Validation(report));
            }
        }
        Ok(object)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .field("has_schema", &self.schema.is_some())
            .finish()
    }
}

/// Collects registrations and checks them before producing a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<RegistryEntry>,
    legacy: LegacyTable,
}

impl RegistryBuilder {
    /// Empty builder with the default legacy table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `T` under its tag. Conflicts surface in [`build`](Self::build).
    pub fn register<T: Revive>(mut self) -> Self {
        self.entries.push(RegistryEntry::of::<T>());
        self
    }

    /// Replace the default legacy table.
    pub fn legacy_table(mut self, table: LegacyTable) -> Self {
        self.legacy = table;
        self
    }

    /// Check every registration and freeze the result.
    ///
    /// Rejects empty, duplicate, and reserved tags, tags that also appear in
    /// the legacy table, and schemas that check fields their type's
    /// allow-list never restores.
    pub fn build(self) -> Result<Registry, RegistryError> {
        self.legacy.check()?;

        let mut entries = HashMap::with_capacity(self.entries.len());
        for entry in self.entries {
            if entry.tag.is_empty() {
                return Err(RegistryError::EmptyTag {
                    type_name: entry.type_name,
                });
            }
            if entry.tag == MAP_TAG || entry.tag == SET_TAG {
                return Err(RegistryError::ReservedTag {
                    tag: entry.tag.to_string(),
                });
            }
            if self.legacy.contains(entry.tag) {
                return Err(RegistryError::LegacyConflict {
                    tag: entry.tag.to_string(),
                });
            }
            if let (Some(schema), Some(allowed)) = (&entry.schema, entry.allow_list) {
                if let Some(field) = schema.field_names().find(|name| !allowed.contains(name)) {
                    return Err(RegistryError::SchemaFieldExcluded {
                        tag: entry.tag.to_string(),
                        field: field.to_string(),
                    });
                }
            }
            let tag = entry.tag;
            if entries.insert(tag, entry).is_some() {
                return Err(RegistryError::DuplicateTag {
                    tag: tag.to_string(),
                });
            }
        }

        Ok(Registry {
            entries,
            legacy: self.legacy,
        })
    }
}

/// Frozen mapping from tag to reconstruction capability.
///
/// Built once at startup and never mutated afterwards. Most programs
/// [`install`](Registry::install) one registry for the whole process; tools
/// and tests may also pass a local one to the reviver directly.
#[derive(Debug)]
pub struct Registry {
    entries: HashMap<&'static str, RegistryEntry>,
    legacy: LegacyTable,
}

impl Registry {
    /// Start a new [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Install as the process-wide registry. Only the first call succeeds.
    pub fn install(self) -> Result<&'static Registry, RegistryError> {
        let count = self.entries.len();
        GLOBAL.set(self).map_err(|_| RegistryError::AlreadyInstalled)?;
        debug!(types = count, "registry installed");
        Self::global()
    }

    /// The process-wide registry.
    pub fn global() -> Result<&'static Registry, RegistryError> {
        GLOBAL.get().ok_or(RegistryError::NotInstalled)
    }

    /// Entry registered for `tag`.
    pub fn get(&self, tag: &str) -> Option<&RegistryEntry> {
        self.entries.get(tag)
    }

    /// Whether `tag` is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Legacy table consulted for unregistered tags.
    pub fn legacy(&self) -> &LegacyTable {
        &self.legacy
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = self.entries.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no type is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::legacy::{LegacyEntry, LegacyStrategy};
    use crate::testing::{registry, Explicit, Gauge, Inner, Misaligned, Player, Reserved, Strict, Untagged};

    static PLAYER_RETIRED: &[LegacyEntry] = &[LegacyEntry {
        tag: "Player",
        retired_in: "0.9.0",
        note: "",
        strategy: LegacyStrategy::Unwrap,
    }];

    #[test]
    fn builds_and_lists_tags() {
        let registry = registry();
        assert!(registry.contains("Player"));
        assert!(registry.get("Gauge").unwrap().schema().is_some());
        assert!(registry.tags().windows(2).all(|w| w[0] < w[1]));
        assert!(registry.legacy().contains("Employee"));
    }

    #[test]
    fn duplicate_tag_is_rejected() {
        let err = Registry::builder()
            .register::<Player>()
            .register::<Player>()
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTag { tag: "Player".into() });
    }

    #[test]
    fn empty_tag_is_rejected() {
        let err = Registry::builder().register::<Untagged>().build().unwrap_err();
        assert!(matches!(err, RegistryError::EmptyTag { .. }));
    }

    #[test]
    fn container_tags_are_reserved() {
        let err = Registry::builder().register::<Reserved>().build().unwrap_err();
        assert_eq!(err, RegistryError::ReservedTag { tag: "JSONSet".into() });
    }

    #[test]
    fn registered_tag_may_not_be_legacy() {
        let err = Registry::builder()
            .legacy_table(LegacyTable::new(PLAYER_RETIRED))
            .register::<Player>()
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::LegacyConflict { tag: "Player".into() });
    }

    #[test]
    fn schema_outside_allow_list_is_rejected() {
        let err = Registry::builder().register::<Misaligned>().build().unwrap_err();
        assert_eq!(
            err,
            RegistryError::SchemaFieldExcluded {
                tag: "Misaligned".into(),
                field: "skipped".into(),
            }
        );
        assert!(Registry::builder().register::<Explicit>().build().is_ok());
    }

    #[test]
    fn entry_validates_revived_instance() {
        let registry = registry();
        let entry = registry.get("Gauge").unwrap();
        let bad = Envelope::new("Gauge", Node::from(json!({"v": "not-a-number"})));
        assert!(matches!(entry.revive(bad), Err(ReviveError::Validation(_))));

        let good = Envelope::new("Gauge", Node::from(json!({"v": 2.5})));
        let object = entry.revive(good).unwrap();
        assert_eq!(object.as_any().downcast_ref::<Gauge>().unwrap().v, json!(2.5));
    }

    #[test]
    fn closed_schema_ignores_fields_outside_allow_list() {
        let registry = registry();
        let strict = Strict { kept: 1, skipped: 9 };
        let envelope = strict.to_envelope().unwrap();
        assert_eq!(envelope.data, json!({"kept": 1}));

        let object = registry
            .get("Strict")
            .unwrap()
            .revive(Envelope::new("Strict", Node::from(envelope.data)))
            .unwrap();
        assert_eq!(
            object.as_any().downcast_ref::<Strict>().unwrap(),
            &Strict { kept: 1, skipped: 0 }
        );
    }

    #[test]
    fn entry_without_schema_skips_validation() {
        let registry = registry();
        let entry = registry.get("Inner").unwrap();
        let object = entry.revive(Envelope::new("Inner", Node::from(json!({"v": 1})))).unwrap();
        assert_eq!(object.as_any().downcast_ref::<Inner>().unwrap().v, 1.0);
    }

    #[test]
    fn global_install_happens_once() {
        // The only test in this crate that touches the process-wide registry.
        let installed = registry().install().unwrap();
        assert!(installed.contains("Player"));
        assert!(Registry::global().unwrap().contains("Outer"));
        assert_eq!(registry().install().unwrap_err(), RegistryError::AlreadyInstalled);
    }
}
