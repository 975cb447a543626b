//! Schema normalization
//!
//! Turns the raw key → definition mapping of a kinds document into a
//! sorted list of [`KindRecord`]s. Keys starting with `_` hold anchor
//! templates for the rest of the document and never become kinds.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_yaml::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{KindError, Result};
use crate::schema::{scalar_string, ContentFormat, KindRecord, TagSpec, NO_DESCRIPTION};

/// The root mapping of a kinds document, in document order.
///
/// Keys keep their source text: YAML would otherwise read `0x10` or
/// `0o7` as integers, and those are not base-10 kind numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSchema {
    entries: Vec<(String, Value)>,
}

impl RawSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a kinds document; its root must be a mapping
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text)?;
        if !root.is_mapping() {
            return Err(KindError::NotAMapping);
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.push((key.into(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl FromIterator<(String, Value)> for RawSchema {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for RawSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RawSchemaVisitor)
    }
}

struct RawSchemaVisitor;

impl<'de> Visitor<'de> for RawSchemaVisitor {
    type Value = RawSchema;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of kind numbers to definitions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<RawSchema, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((KeyText(key), value)) = map.next_entry::<KeyText, Value>()? {
            entries.push((key, value));
        }
        Ok(RawSchema { entries })
    }
}

/// A mapping key as written in the document
struct KeyText(String);

impl<'de> Deserialize<'de> for KeyText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // serde_yaml hands plain scalars to `visit_str` unresolved
        deserializer.deserialize_str(KeyTextVisitor)
    }
}

struct KeyTextVisitor;

impl<'de> Visitor<'de> for KeyTextVisitor {
    type Value = KeyText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar mapping key")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<KeyText, E> {
        Ok(KeyText(v.to_string()))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> std::result::Result<KeyText, E> {
        Ok(KeyText(v))
    }
}

/// Outcome of normalizing one document
#[derive(Debug, Default)]
pub struct NormalizeReport {
    /// Kinds sorted ascending by number, numbers unique
    pub kinds: Vec<KindRecord>,
    /// Entries that were dropped, as [`KindError::MalformedKind`]
    pub skipped: Vec<KindError>,
}

/// Normalize a raw mapping, discarding the skip report
pub fn normalize(raw: &RawSchema) -> Vec<KindRecord> {
    normalize_with_report(raw).kinds
}

/// Normalize a raw mapping, keeping track of skipped entries
pub fn normalize_with_report(raw: &RawSchema) -> NormalizeReport {
    let mut report = NormalizeReport {
        kinds: Vec::with_capacity(raw.len()),
        skipped: Vec::new(),
    };

    for (key, value) in raw.iter() {
        let number = match parse_kind_key(key) {
            KindKey::Number(number) => number,
            KindKey::Template => {
                debug!(template = key, "skipping template entry");
                continue;
            }
            KindKey::Malformed => {
                warn!(key = key, "skipping entry with malformed kind number");
                report.skipped.push(KindError::MalformedKind { key: key.to_string() });
                continue;
            }
        };

        let record = parse_record(number, value);
        debug!(kind = number, tags = record.tags.len(), "normalized kind");
        report.kinds.push(record);
    }

    // Stable sort: on a collision ("1" and "01") the first wins.
    report.kinds.sort_by_key(|k| k.number);
    let before = report.kinds.len();
    report.kinds.dedup_by_key(|k| k.number);
    if report.kinds.len() != before {
        warn!(dropped = before - report.kinds.len(), "dropped duplicate kind numbers");
    }

    report
}

enum KindKey {
    Number(u32),
    Template,
    Malformed,
}

fn parse_kind_key(key: &str) -> KindKey {
    if key.starts_with('_') {
        return KindKey::Template;
    }
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return KindKey::Malformed;
    }
    // all digits, so only overflow can fail here
    key.parse::<u32>().map(KindKey::Number).unwrap_or(KindKey::Malformed)
}

fn parse_record(number: u32, value: &Value) -> KindRecord {
    let description = value
        .get("description")
        .and_then(scalar_string)
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let content = value
        .get("content")
        .and_then(Value::as_str)
        .map(ContentFormat::from_label)
        .unwrap_or_default();

    let tags = value
        .get("tags")
        .and_then(Value::as_sequence)
        .map(|tags| tags.iter().map(parse_tag).collect())
        .unwrap_or_default();

    KindRecord {
        number,
        description,
        content,
        tags,
    }
}

fn parse_tag(value: &Value) -> TagSpec {
    // A bare scalar is shorthand for a name-only tag.
    if let Some(name) = scalar_string(value) {
        return TagSpec::named(name, Vec::new());
    }

    let name = value.get("name").and_then(scalar_string);
    let prefix = value.get("prefix").and_then(scalar_string);
    let head = value.get("next").filter(|next| !next.is_null());

    let tag = TagSpec::from_links(name, prefix, head);
    if tag.chain.is_malformed() {
        warn!(tag = tag.discriminator().unwrap_or("<unnamed>"), "tag field chain is malformed");
    }
    tag
}
