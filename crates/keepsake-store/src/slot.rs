use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Longest accepted slot name.
pub const MAX_SLOT_LEN: usize = 64;

/// Validated save-slot name.
///
/// Slot names become file names, so only `[A-Za-z0-9_-]` is accepted.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SlotName(String);

impl SlotName {
    /// Validate `name` as a slot name.
    pub fn new(name: impl Into<String>) -> StoreResult<Self> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("empty")
        } else if name.len() > MAX_SLOT_LEN {
            Some("longer than 64 characters")
        } else if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            Some("only ASCII letters, digits, '_' and '-' are allowed")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(StoreError::InvalidSlot { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// The name as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SlotName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Listing entry for one stored save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    pub name: SlotName,
    pub bytes: u64,
    /// Last write time, when the backend tracks it.
    pub modified: Option<DateTime<Utc>>,
}
