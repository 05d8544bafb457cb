//! Registered types shared by this crate's tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use keepsake_schema::{Schema, Shape};
use keepsake_types::{Envelope, Node, SaveSet};
use serde_json::Value;

use crate::error::ReviveResult;
use crate::generic::generic_from_json;
use crate::registry::{Registry, RegistryBuilder};
use crate::save_object;
use crate::traits::Revive;

thread_local! {
    static CALLS: RefCell<Vec<&'static str>> = RefCell::new(Vec::new());
}

fn record(call: &'static str) {
    CALLS.with(|calls| calls.borrow_mut().push(call));
}

/// Reconstruction calls seen on this thread since the last take.
pub(crate) fn take_calls() -> Vec<&'static str> {
    CALLS.with(|calls| calls.take())
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Player {
    pub name: String,
    pub hp: u32,
    pub extra: BTreeMap<String, Node>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: String::new(),
            hp: 10,
            extra: BTreeMap::new(),
        }
    }
}

impl Revive for Player {
    const TAG: &'static str = "Player";
}

save_object!(Player { name, hp } extra: extra);

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Inner {
    pub v: f64,
}

impl Revive for Inner {
    const TAG: &'static str = "Inner";

    fn from_json(envelope: Envelope<Node>) -> ReviveResult<Self> {
        record("Inner");
        generic_from_json(envelope.data, Self::ALLOW_LIST)
    }
}

save_object!(Inner { v });

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Outer {
    pub label: String,
    pub inner: Option<Inner>,
}

impl Revive for Outer {
    const TAG: &'static str = "Outer";

    fn from_json(envelope: Envelope<Node>) -> ReviveResult<Self> {
        let live = envelope
            .data
            .get("inner")
            .and_then(Node::downcast_ref::<Inner>)
            .is_some();
        record(if live { "Outer(live inner)" } else { "Outer(raw inner)" });
        generic_from_json(envelope.data, Self::ALLOW_LIST)
    }
}

save_object!(Outer { label, inner });

/// Loose field guarded only by its schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Gauge {
    pub v: Value,
}

impl Revive for Gauge {
    const TAG: &'static str = "Gauge";

    fn schema() -> Option<Schema> {
        Some(Schema::new().required("v", Shape::Number))
    }
}

save_object!(Gauge { v });

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Explicit {
    pub kept: u32,
    pub skipped: u32,
    pub extra: BTreeMap<String, Node>,
}

impl Revive for Explicit {
    const TAG: &'static str = "Explicit";
    const ALLOW_LIST: Option<&'static [&'static str]> = Some(&["kept"]);

    fn schema() -> Option<Schema> {
        Some(Schema::new().required("kept", Shape::Integer))
    }
}

save_object!(Explicit { kept, skipped } extra: extra);

/// Closed schema over an allow-listed subset of fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Strict {
    pub kept: u32,
    pub skipped: u32,
}

impl Revive for Strict {
    const TAG: &'static str = "Strict";
    const ALLOW_LIST: Option<&'static [&'static str]> = Some(&["kept"]);

    fn schema() -> Option<Schema> {
        Some(Schema::new().required("kept", Shape::Integer).closed())
    }
}

save_object!(Strict { kept, skipped });

/// Schema names a field the allow-list never restores.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Misaligned {
    pub kept: u32,
    pub skipped: u32,
}

impl Revive for Misaligned {
    const TAG: &'static str = "Misaligned";
    const ALLOW_LIST: Option<&'static [&'static str]> = Some(&["kept"]);

    fn schema() -> Option<Schema> {
        Some(Schema::new().required("skipped", Shape::Integer))
    }
}

save_object!(Misaligned { kept, skipped });

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Scratch {
    pub note: String,
}

impl Revive for Scratch {
    const TAG: &'static str = "Scratch";
}

save_object!(Scratch { note });

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Faction {
    pub name: String,
    pub members: SaveSet<String>,
}

impl Revive for Faction {
    const TAG: &'static str = "Faction";
}

save_object!(Faction { name, members });

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Untagged;

impl Revive for Untagged {
    const TAG: &'static str = "";
}

save_object!(Untagged {});

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Reserved;

impl Revive for Reserved {
    const TAG: &'static str = "JSONSet";
}

save_object!(Reserved {});

/// Builder with every well-formed fixture registered.
pub(crate) fn builder() -> RegistryBuilder {
    Registry::builder()
        .register::<Player>()
        .register::<Inner>()
        .register::<Outer>()
        .register::<Gauge>()
        .register::<Explicit>()
        .register::<Strict>()
        .register::<Scratch>()
        .register::<Faction>()
}

pub(crate) fn registry() -> Registry {
    match builder().build() {
        Ok(registry) => registry,
        Err(err) => panic!("fixture registry must build: {err}"),
    }
}
