//! Record shapes persisted under a guild's backup root.
//!
//! Field names match the JSON files that earlier exports produced so a
//! viewer built against old data keeps working.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Snowflake;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// One archived message (`messages/<id>/message.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageRecord {
    /// Creation time in milliseconds since the Unix epoch.
    pub date: u64,
    /// Creation time as an RFC 1123 style UTC string.
    pub date_string: String,
    pub sender_id: Snowflake,
    pub sender_name: String,
    /// Raw message text as the platform returned it.
    pub contents: String,
    /// Text with mentions resolved to readable names.
    pub contents_clean: String,
    /// Local attachment filenames when attachments were downloaded,
    /// otherwise the remote attachment URLs.
    pub attachments: Vec<String>,
}

/// Format epoch milliseconds the way `date_string` stores them,
/// e.g. `Tue, 14 Mar 2023 12:00:00 GMT`.
pub fn format_utc(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// One archived channel inside `channels.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    /// Message ids in fetch order (newest first).
    pub messages: Vec<Snowflake>,
}

impl ChannelRecord {
    pub fn new(name: impl Into<String>, parent_id: Option<Snowflake>, parent_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            parent_id,
            parent_name,
            messages: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRecord {
    pub name: String,
    /// `#rrggbb`
    pub color: String,
}

/// One archived member inside `members.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberRecord {
    pub name: String,
    pub roles: Vec<RoleRecord>,
}

// ---------------------------------------------------------------------------
// Ordered maps
// ---------------------------------------------------------------------------

/// Id-keyed mapping that serializes as a JSON object in insertion order.
///
/// Re-inserting an existing key replaces the value but keeps its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(Snowflake, V)>,
}

pub type ChannelMap = OrderedMap<ChannelRecord>;
pub type MemberMap = OrderedMap<MemberRecord>;

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, key: Snowflake, value: V) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: Snowflake) -> Option<&V> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<(Snowflake, &V)> {
        self.entries.first().map(|(k, v)| (*k, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Snowflake, &V)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = Snowflake> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by snowflake")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((key, value)) = access.next_entry::<Snowflake, V>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
