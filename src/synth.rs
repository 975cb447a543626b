//! Example event synthesis
//!
//! Builds an illustrative event for a kind from its schema entry. Hex
//! fields, signatures and URLs are placeholders; nothing here is
//! cryptographically meaningful.
//!
//! ## Tag synthesis
//!
//! Each [`TagSpec`] yields one array: the discriminator followed by one
//! value per field in its chain. Two choices are configurable through
//! [`SynthesisConfig`]:
//!
//! - tags with neither `name` nor `prefix` become `["unnamed"]` by
//!   default, or are omitted with [`UnnamedTagPolicy::Omit`]
//! - constrained fields take the first allowed literal by default, or a
//!   random one with [`ConstrainedPick::Random`]
//!
//! A malformed chain replaces the tag's fields with
//! [`MALFORMED_CHAIN_MARKER`]; the rest of the event is unaffected.

use chrono::Utc;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::OutputFormat;
use crate::error::{KindError, Result};
use crate::schema::{ContentFormat, FieldChain, FieldSpec, FieldType, KindRecord, TagSpec};

pub const EVENT_ID_PLACEHOLDER: &str = "<32-bytes lowercase hex-encoded sha256 of the serialized event data>";
pub const EVENT_PUBKEY_PLACEHOLDER: &str = "<32-bytes lowercase hex-encoded public key of the event creator>";
pub const EVENT_SIG_PLACEHOLDER: &str = "<64-bytes lowercase hex of the signature of the sha256 hash of the serialized event data>";

pub const JSON_CONTENT_PLACEHOLDER: &str = r#"{"<key>": "<value>"}"#;
pub const FREE_CONTENT_PLACEHOLDER: &str = "<arbitrary text>";
pub const EMPTY_CONTENT_PLACEHOLDER: &str = "";

pub const ID_PLACEHOLDER: &str = "<32-bytes lowercase hex event id>";
pub const PUBKEY_PLACEHOLDER: &str = "<32-bytes lowercase hex public key>";
pub const RELAY_PLACEHOLDER: &str = "wss://relay.example.com";
pub const URL_PLACEHOLDER: &str = "https://example.com";
pub const VALUE_PLACEHOLDER: &str = "<value>";
pub const ADDR_PLACEHOLDER: &str = "<kind>:<32-bytes lowercase hex public key>:<identifier>";
pub const KIND_PLACEHOLDER: &str = "1";

/// Label used for tags without a discriminator
pub const UNNAMED_TAG_LABEL: &str = "unnamed";

/// Substituted for the fields of a tag whose chain is malformed
pub const MALFORMED_CHAIN_MARKER: &str = "<malformed field chain>";

/// What to do with a tag that has neither `name` nor `prefix`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnnamedTagPolicy {
    /// Emit `["unnamed"]`
    #[default]
    Label,
    /// Leave the tag out of the example
    Omit,
}

/// How a constrained field picks its example value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConstrainedPick {
    #[default]
    First,
    Random,
}

/// Synthesis settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SynthesisConfig {
    #[serde(default)]
    pub unnamed_tags: UnnamedTagPolicy,
    #[serde(default)]
    pub constrained: ConstrainedPick,
}

/// A synthesized example event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleEvent {
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u32,
    pub tags: Vec<Vec<String>>,
    pub content: String,
    pub sig: String,
}

impl ExampleEvent {
    pub fn to_json(&self, format: OutputFormat) -> Result<String> {
        let json = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
            OutputFormat::Compact => serde_json::to_string(self)?,
        };
        Ok(json)
    }
}

/// Synthesize an example for `record` with default settings
pub fn synthesize_example(record: &KindRecord) -> ExampleEvent {
    ExampleSynthesizer::default().synthesize(record)
}

/// Placeholder content for a content format
pub fn content_placeholder(content: ContentFormat) -> &'static str {
    match content {
        ContentFormat::Json => JSON_CONTENT_PLACEHOLDER,
        ContentFormat::Empty => EMPTY_CONTENT_PLACEHOLDER,
        ContentFormat::Free | ContentFormat::Unknown => FREE_CONTENT_PLACEHOLDER,
    }
}

/// Builds example events from kind records
#[derive(Debug, Clone, Default)]
pub struct ExampleSynthesizer {
    config: SynthesisConfig,
}

impl ExampleSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize an example stamped with the current time
    pub fn synthesize(&self, record: &KindRecord) -> ExampleEvent {
        self.synthesize_at(record, Utc::now().timestamp())
    }

    /// Synthesize an example with a fixed `created_at`
    pub fn synthesize_at(&self, record: &KindRecord, created_at: i64) -> ExampleEvent {
        let tags = record
            .tags
            .iter()
            .filter_map(|tag| match self.try_synthesize_tag(tag) {
                Ok(value) => value,
                Err(err) => {
                    warn!(kind = record.number, error = %err, "substituting marker for malformed tag");
                    Some(vec![
                        tag.discriminator().unwrap_or(UNNAMED_TAG_LABEL).to_string(),
                        MALFORMED_CHAIN_MARKER.to_string(),
                    ])
                }
            })
            .collect();

        ExampleEvent {
            id: EVENT_ID_PLACEHOLDER.to_string(),
            pubkey: EVENT_PUBKEY_PLACEHOLDER.to_string(),
            created_at,
            kind: record.number,
            tags,
            content: content_placeholder(record.content).to_string(),
            sig: EVENT_SIG_PLACEHOLDER.to_string(),
        }
    }

    /// Synthesize a single tag value.
    ///
    /// Returns `Ok(None)` when the tag is omitted by policy and
    /// [`KindError::MalformedChain`] when its chain is malformed.
    pub fn try_synthesize_tag(&self, tag: &TagSpec) -> Result<Option<Vec<String>>> {
        let Some(discriminator) = tag.discriminator() else {
            return Ok(match self.config.unnamed_tags {
                UnnamedTagPolicy::Label => Some(vec![UNNAMED_TAG_LABEL.to_string()]),
                UnnamedTagPolicy::Omit => None,
            });
        };

        let fields = match &tag.chain {
            FieldChain::Fields(fields) => fields,
            FieldChain::Malformed { limit } => {
                return Err(KindError::MalformedChain {
                    tag: discriminator.to_string(),
                    limit: *limit,
                })
            }
        };

        let mut value = Vec::with_capacity(fields.len() + 1);
        value.push(discriminator.to_string());
        value.extend(fields.iter().filter_map(|field| self.field_value(field)));

        debug!(tag = discriminator, len = value.len(), "synthesized tag");
        Ok(Some(value))
    }

    /// Example value for one field; `None` for a constrained field with
    /// no allowed literals
    pub fn field_value(&self, field: &FieldSpec) -> Option<String> {
        let value = match &field.field_type {
            FieldType::Id => ID_PLACEHOLDER,
            FieldType::Pubkey => PUBKEY_PLACEHOLDER,
            FieldType::Relay => RELAY_PLACEHOLDER,
            FieldType::Url => URL_PLACEHOLDER,
            FieldType::Addr => ADDR_PLACEHOLDER,
            FieldType::Kind => KIND_PLACEHOLDER,
            FieldType::Constrained => return self.pick(&field.either),
            FieldType::Free | FieldType::Missing | FieldType::Other(_) => VALUE_PLACEHOLDER,
        };
        Some(value.to_string())
    }

    fn pick(&self, either: &[String]) -> Option<String> {
        let chosen = match self.config.constrained {
            ConstrainedPick::First => either.first(),
            ConstrainedPick::Random => either.choose(&mut rand::thread_rng()),
        };
        chosen.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(tag: TagSpec) -> KindRecord {
        KindRecord::new(1, "Short text note")
            .with_content(ContentFormat::Free)
            .with_tag(tag)
    }

    #[test]
    fn test_event_header() {
        let record = KindRecord::new(30023, "Long-form content").with_content(ContentFormat::Free);
        let event = ExampleSynthesizer::default().synthesize_at(&record, 1_700_000_000);
        assert_eq!(event.kind, 30023);
        assert_eq!(event.created_at, 1_700_000_000);
        assert_eq!(event.id, EVENT_ID_PLACEHOLDER);
        assert_eq!(event.pubkey, EVENT_PUBKEY_PLACEHOLDER);
        assert_eq!(event.sig, EVENT_SIG_PLACEHOLDER);
        assert!(event.tags.is_empty());
    }

    #[test]
    fn test_content_placeholders() {
        assert_eq!(content_placeholder(ContentFormat::Empty), EMPTY_CONTENT_PLACEHOLDER);
        assert_eq!(
            content_placeholder(ContentFormat::Unknown),
            content_placeholder(ContentFormat::Free)
        );
        let parsed: serde_json::Value = serde_json::from_str(content_placeholder(ContentFormat::Json)).unwrap();
        assert!(parsed.is_object());
    }

    #[test]
    fn test_every_field_type() {
        let synth = ExampleSynthesizer::default();
        let cases = [
            (FieldType::Id, ID_PLACEHOLDER),
            (FieldType::Pubkey, PUBKEY_PLACEHOLDER),
            (FieldType::Relay, RELAY_PLACEHOLDER),
            (FieldType::Url, URL_PLACEHOLDER),
            (FieldType::Free, VALUE_PLACEHOLDER),
            (FieldType::Addr, ADDR_PLACEHOLDER),
            (FieldType::Kind, KIND_PLACEHOLDER),
            (FieldType::Other("hex".into()), VALUE_PLACEHOLDER),
            (FieldType::Missing, VALUE_PLACEHOLDER),
        ];
        for (ty, expected) in cases {
            assert_eq!(synth.field_value(&FieldSpec::new(ty)).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_constrained_first() {
        let synth = ExampleSynthesizer::default();
        let field = FieldSpec::constrained(["reply", "root", "mention"]);
        assert_eq!(synth.field_value(&field).as_deref(), Some("reply"));
    }

    #[test]
    fn test_constrained_random_stays_in_set() {
        let synth = ExampleSynthesizer::new(SynthesisConfig {
            constrained: ConstrainedPick::Random,
            ..Default::default()
        });
        let field = FieldSpec::constrained(["a", "b"]);
        for _ in 0..32 {
            let value = synth.field_value(&field).unwrap();
            assert!(value == "a" || value == "b");
        }
    }

    #[test]
    fn test_empty_constraint_emits_nothing() {
        let tag = TagSpec::named(
            "k",
            vec![FieldSpec::constrained(Vec::<String>::new()), FieldSpec::new(FieldType::Free)],
        );
        let value = ExampleSynthesizer::default().try_synthesize_tag(&tag).unwrap().unwrap();
        assert_eq!(value, vec!["k", VALUE_PLACEHOLDER]);
    }

    #[test]
    fn test_unnamed_tag_policies() {
        let tag = TagSpec::default();

        let labelled = synthesize_example(&record_with(tag.clone()));
        assert_eq!(labelled.tags, vec![vec![UNNAMED_TAG_LABEL.to_string()]]);

        let omitting = ExampleSynthesizer::new(SynthesisConfig {
            unnamed_tags: UnnamedTagPolicy::Omit,
            ..Default::default()
        });
        assert!(omitting.synthesize(&record_with(tag)).tags.is_empty());
    }

    #[test]
    fn test_malformed_chain_marker() {
        let tag = TagSpec {
            name: Some("e".into()),
            prefix: None,
            chain: FieldChain::Malformed { limit: 64 },
        };
        let synth = ExampleSynthesizer::default();
        assert!(matches!(
            synth.try_synthesize_tag(&tag),
            Err(KindError::MalformedChain { .. })
        ));

        let record = record_with(tag).with_tag(TagSpec::named("t", vec![FieldSpec::new(FieldType::Free)]));
        let event = synth.synthesize(&record);
        assert_eq!(event.tags[0], vec!["e", MALFORMED_CHAIN_MARKER]);
        assert_eq!(event.tags[1], vec!["t", VALUE_PLACEHOLDER]);
    }

    #[test]
    fn test_compact_json() {
        let record = KindRecord::new(7, "Reaction").with_content(ContentFormat::Free);
        let event = ExampleSynthesizer::default().synthesize_at(&record, 0);
        let json = event.to_json(OutputFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        let back: ExampleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
