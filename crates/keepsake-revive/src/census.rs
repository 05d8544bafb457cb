//! Tag census over raw save documents.
//!
//! A census reads the parsed JSON without reviving anything, so it works on
//! saves whose types are not registered in the running process. Tools use it
//! to report what a save contains and loaders use it to refuse a file before
//! any reconstruction runs.

use std::collections::BTreeMap;

use keepsake_types::{Envelope, CTOR_KEY, DATA_KEY, MAP_TAG, SET_TAG};
use serde::Serialize;
use serde_json::Value;

use crate::legacy::LegacyTable;
use crate::registry::Registry;

/// Envelope-like node that the reviver would pass through untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MalformedEnvelope {
    /// JSONPath-style location, e.g. `$.world.units[3]`.
    pub path: String,
    pub reason: String,
}

/// How a census tag resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TagStatus {
    Live,
    Container,
    Legacy {
        retired_in: &'static str,
        note: &'static str,
    },
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagReport {
    pub tag: String,
    pub count: usize,
    #[serde(flatten)]
    pub status: TagStatus,
}

/// Counts of every envelope tag found in a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TagCensus {
    pub tags: BTreeMap<String, usize>,
    pub malformed: Vec<MalformedEnvelope>,
    /// Total JSON nodes visited.
    pub nodes: usize,
}

impl TagCensus {
    /// Total envelopes found.
    pub fn envelopes(&self) -> usize {
        self.tags.values().sum()
    }

    /// Resolve every tag against a registry and its legacy table.
    pub fn classify(&self, registry: &Registry) -> Vec<TagReport> {
        self.classify_with(|tag| registry.contains(tag), registry.legacy())
    }

    /// Resolve every tag against a legacy table alone; no tag is live.
    pub fn classify_legacy(&self, legacy: &LegacyTable) -> Vec<TagReport> {
        self.classify_with(|_| false, legacy)
    }

    /// Resolve every tag, in tag order, with the same precedence as the
    /// reviver: containers, then live types, then the legacy table.
    pub fn classify_with<F>(&self, is_live: F, legacy: &LegacyTable) -> Vec<TagReport>
    where
        F: Fn(&str) -> bool,
    {
        self.tags
            .iter()
            .map(|(tag, &count)| {
                let status = if tag == MAP_TAG || tag == SET_TAG {
                    TagStatus::Container
                } else if is_live(tag) {
                    TagStatus::Live
                } else if let Some(entry) = legacy.lookup(tag) {
                    TagStatus::Legacy {
                        retired_in: entry.retired_in,
                        note: entry.note,
                    }
                } else {
                    TagStatus::Unknown
                };
                TagReport {
                    tag: tag.clone(),
                    count,
                    status,
                }
            })
            .collect()
    }
}

/// Walk a parsed document and count envelope tags.
pub fn census(value: &Value) -> TagCensus {
    let mut census = TagCensus::default();
    visit(value, "$".to_string(), &mut census);
    census
}

fn visit(value: &Value, path: String, census: &mut TagCensus) {
    census.nodes += 1;
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                visit(item, format!("{path}[{index}]"), census);
            }
        }
        Value::Object(fields) => {
            if let Some(tag) = Envelope::peek_tag(value) {
                *census.tags.entry(tag.to_string()).or_default() += 1;
                if let Some(reason) = fields.get(DATA_KEY).and_then(|data| container_problem(tag, data)) {
                    census.malformed.push(MalformedEnvelope {
                        path: path.clone(),
                        reason,
                    });
                }
            } else if let Some(ctor) = fields.get(CTOR_KEY) {
                census.malformed.push(MalformedEnvelope {
                    path: path.clone(),
                    reason: envelope_problem(ctor, fields.contains_key(DATA_KEY)),
                });
            }
            for (key, child) in fields {
                visit(child, format!("{path}.{key}"), census);
            }
        }
        _ => {}
    }
}

fn envelope_problem(ctor: &Value, has_data: bool) -> String {
    match ctor.as_str() {
        None => "ctor is not a string".to_string(),
        Some("") => "ctor is empty".to_string(),
        Some(_) if !has_data => "data is missing".to_string(),
        Some(_) => "not an envelope".to_string(),
    }
}

fn container_problem(tag: &str, data: &Value) -> Option<String> {
    match tag {
        SET_TAG if !data.is_array() => Some("JSONSet payload is not an array".to_string()),
        MAP_TAG => match data.as_array() {
            None => Some("JSONMap payload is not an array".to_string()),
            Some(pairs) => pairs
                .iter()
                .position(|pair| pair.as_array().map_or(true, |pair| pair.len() != 2))
                .map(|index| format!("JSONMap entry {index} is not a [key, value] pair")),
        },
        _ => None,
    }
}
