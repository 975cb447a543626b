//! Golden Tests for Example Synthesis
//!
//! Loads fixture documents end to end and checks the examples built from
//! them.

use std::cell::RefCell;
use std::rc::Rc;

use kind_registry::synth::{
    ADDR_PLACEHOLDER, EMPTY_CONTENT_PLACEHOLDER, ID_PLACEHOLDER, KIND_PLACEHOLDER,
    MALFORMED_CHAIN_MARKER, PUBKEY_PLACEHOLDER, RELAY_PLACEHOLDER, URL_PLACEHOLDER,
    VALUE_PLACEHOLDER,
};
use kind_registry::{
    normalize, normalize_with_report, search, synthesize_example, ContentFormat, ExampleSynthesizer,
    FieldLink, FieldSpec, FieldType, KindError, KindRecord, KindRegistry, RawSchema, TagSpec,
    MAX_CHAIN_LEN,
};

fn fixture() -> KindRegistry {
    KindRegistry::from_yaml_str(include_str!("fixtures/kinds.yaml")).unwrap()
}

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn test_fixture_normalization() {
    let registry = fixture();
    let numbers: Vec<u32> = registry.kinds().iter().map(|k| k.number).collect();
    assert_eq!(numbers, vec![1, 30, 40]);

    // "not-a-kind" is malformed; "_relay", "_choice" and "_40" are templates
    assert_eq!(registry.skipped().len(), 1);
    assert!(matches!(
        &registry.skipped()[0],
        KindError::MalformedKind { key } if key == "not-a-kind"
    ));
}

#[test]
fn test_underscore_keys_never_become_kinds() {
    let raw = RawSchema::from_yaml_str("_1: {description: a}\n_: {}\n__2: {}\n_x: {}\n3: {}\n")
        .unwrap();
    let report = normalize_with_report(&raw);
    assert_eq!(report.kinds.len(), 1);
    assert_eq!(report.kinds[0].number, 3);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_broken_document_is_load_error() {
    let err = KindRegistry::from_yaml_str(include_str!("fixtures/broken.yaml")).unwrap_err();
    assert!(err.is_load_error());
}

// =============================================================================
// Synthesis
// =============================================================================

#[test]
fn test_minimal_empty_kind() {
    let raw =
        RawSchema::from_yaml_str(r#"{"1": {"description": "Test", "content": "empty", "tags": []}}"#).unwrap();
    let kinds = normalize(&raw);
    let event = synthesize_example(&kinds[0]);

    assert_eq!(event.kind, 1);
    assert_eq!(event.content, EMPTY_CONTENT_PLACEHOLDER);
    assert!(event.tags.is_empty());
}

#[test]
fn test_json_content_parses() {
    let registry = fixture();
    let kind = registry.get(40).unwrap();
    assert_eq!(kind.content, ContentFormat::Json);

    let event = synthesize_example(kind);
    let content: serde_json::Value = serde_json::from_str(&event.content).unwrap();
    assert!(content.is_object());
}

#[test]
fn test_relay_constrained_free_chain() {
    let registry = fixture();
    let event = synthesize_example(registry.get(40).unwrap());

    let tag = &event.tags[0];
    assert_eq!(tag.len(), 4);
    assert_eq!(tag[0], "x");
    assert_eq!(tag[1], RELAY_PLACEHOLDER);
    assert!(tag[2] == "a" || tag[2] == "b");
    assert_eq!(tag[3], VALUE_PLACEHOLDER);
}

#[test]
fn test_tag_shapes_in_order() {
    let registry = fixture();
    let event = ExampleSynthesizer::default().synthesize_at(registry.get(30).unwrap(), 1_700_000_000);

    assert_eq!(event.created_at, 1_700_000_000);
    assert_eq!(
        event.tags,
        vec![
            vec!["solo".to_string()],
            vec!["imeta".to_string(), URL_PLACEHOLDER.to_string()],
            vec!["unnamed".to_string()],
            vec![
                "mixed".to_string(),
                ID_PLACEHOLDER.to_string(),
                PUBKEY_PLACEHOLDER.to_string(),
                ADDR_PLACEHOLDER.to_string(),
                KIND_PLACEHOLDER.to_string(),
                // empty constraint contributes nothing; "hex" falls back
                VALUE_PLACEHOLDER.to_string(),
            ],
        ]
    );
}

#[test]
fn test_tag_without_fields_is_single_element() {
    let kind = KindRecord::new(5, "x").with_tag(TagSpec::named("d", Vec::new()));
    let event = synthesize_example(&kind);
    assert_eq!(event.tags, vec![vec!["d".to_string()]]);
}

#[test]
fn test_example_json_shape() {
    let registry = fixture();
    let event = synthesize_example(registry.get(1).unwrap());
    let json: serde_json::Value = serde_json::to_value(&event).unwrap();

    for key in ["id", "pubkey", "created_at", "kind", "tags", "content", "sig"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["kind"], 1);
    assert!(json["created_at"].as_i64().unwrap() > 0);
}

// =============================================================================
// Malformed chains
// =============================================================================

struct Node {
    field_type: FieldType,
    next: RefCell<Option<Rc<Node>>>,
}

#[derive(Clone)]
struct Link(Rc<Node>);

impl FieldLink for Link {
    fn field(&self) -> FieldSpec {
        FieldSpec::new(self.0.field_type.clone())
    }

    fn next_link(&self) -> Option<Self> {
        self.0.next.borrow().clone().map(Link)
    }
}

#[test]
fn test_self_referencing_chain_terminates() {
    let node = Rc::new(Node {
        field_type: FieldType::Relay,
        next: RefCell::new(None),
    });
    *node.next.borrow_mut() = Some(Rc::clone(&node));

    let tag = TagSpec::from_links(Some("r".into()), None, Some(Link(Rc::clone(&node))));
    assert!(tag.chain.is_malformed());

    let kind = KindRecord::new(10002, "Relay List Metadata")
        .with_tag(tag)
        .with_tag(TagSpec::named("t", vec![FieldSpec::new(FieldType::Free)]));
    let event = synthesize_example(&kind);

    assert_eq!(event.tags[0], vec!["r", MALFORMED_CHAIN_MARKER]);
    assert_eq!(event.tags[1], vec!["t", VALUE_PLACEHOLDER]);

    let err = ExampleSynthesizer::default()
        .try_synthesize_tag(&kind.tags[0])
        .unwrap_err();
    assert!(matches!(err, KindError::MalformedChain { limit, .. } if limit == MAX_CHAIN_LEN));

    // break the cycle so the nodes are freed
    node.next.borrow_mut().take();
}

#[test]
fn test_overlong_yaml_chain_is_malformed() {
    let mut chain = serde_yaml::Value::Null;
    for _ in 0..=MAX_CHAIN_LEN {
        let mut field = serde_yaml::Mapping::new();
        field.insert("type".into(), "free".into());
        field.insert("next".into(), chain);
        chain = serde_yaml::Value::Mapping(field);
    }

    let mut tag = serde_yaml::Mapping::new();
    tag.insert("name".into(), "deep".into());
    tag.insert("next".into(), chain);

    let mut kind = serde_yaml::Mapping::new();
    kind.insert("tags".into(), serde_yaml::Value::Sequence(vec![serde_yaml::Value::Mapping(tag)]));

    let mut raw = RawSchema::new();
    raw.insert("9", serde_yaml::Value::Mapping(kind));

    let kinds = normalize(&raw);
    assert!(kinds[0].tags[0].chain.is_malformed());
    assert_eq!(
        synthesize_example(&kinds[0]).tags[0],
        vec!["deep", MALFORMED_CHAIN_MARKER]
    );
}

#[test]
fn test_chain_at_limit_is_accepted() {
    let fields: Vec<FieldSpec> = (0..MAX_CHAIN_LEN).map(|_| FieldSpec::new(FieldType::Free)).collect();
    let kind = KindRecord::new(1, "x").with_tag(TagSpec::named("long", fields));
    assert_eq!(synthesize_example(&kind).tags[0].len(), MAX_CHAIN_LEN + 1);
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_search_properties() {
    let registry = fixture();
    let kinds = registry.kinds();

    assert_eq!(search(kinds, "").len(), kinds.len());

    let upper: Vec<u32> = search(kinds, "CHANNEL").iter().map(|k| k.number).collect();
    let lower: Vec<u32> = search(kinds, "channel").iter().map(|k| k.number).collect();
    assert_eq!(upper, lower);
    assert_eq!(lower, vec![40]);

    let by_tag: Vec<u32> = search(kinds, "imeta").iter().map(|k| k.number).collect();
    assert_eq!(by_tag, vec![30]);
}

#[test]
fn test_embedded_examples_are_well_formed() {
    let registry = KindRegistry::from_embedded().unwrap();
    let synth = ExampleSynthesizer::default();

    for kind in registry.kinds() {
        let event = synth.synthesize(kind);
        assert_eq!(event.kind, kind.number);
        assert_eq!(event.tags.len(), kind.tags.len());
        assert!(event.tags.iter().all(|tag| !tag.is_empty()));
        assert!(event.tags.iter().flatten().all(|v| v != MALFORMED_CHAIN_MARKER));
        if kind.content == ContentFormat::Json {
            assert!(serde_json::from_str::<serde_json::Value>(&event.content).is_ok());
        }
    }

    assert!(registry.lint().iter().all(|r| r.is_clean()));
}
