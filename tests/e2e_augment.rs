//! End-to-end tests for document augmentation.
//!
//! Covers the splice against hand-written base documents, the augmentor
//! against real content, and property tests asserting that a spliced document
//! always parses and carries exactly the union of base and contributed keys.

use std::collections::BTreeMap;
use std::sync::Arc;

use catalog_search::document::splice::{splice, structured_merge};
use catalog_search::modifier::Fragment;
use catalog_search::{
    ContentKind, ContentObject, ContentRef, ContentType, DocumentAugmentor, Error, Formatting,
    IndexingConfig, IndexingModifier, ModifierArgs, ModifierPipeline, PropertyDescriptor,
    SpliceStrategy, TypeDescriptor,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value as JsonValue};

fn fragment(value: JsonValue) -> Fragment {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn product() -> ContentObject {
    let ty = ContentType::new("ShoeProduct")
        .with_property(PropertyDescriptor::new("Brand", TypeDescriptor::simple("String")))
        .with_property(PropertyDescriptor::new("DisplayName", TypeDescriptor::simple("String")))
        .with_property(PropertyDescriptor::new(
            "Lazy",
            TypeDescriptor::generic("Deferred", [TypeDescriptor::simple("String")]),
        ));
    ContentObject::new(ContentRef::with_provider(7, "catalog"), "Runner", ContentKind::Product, Arc::new(ty))
        .with_parent(ContentRef::with_provider(3, "catalog"))
        .with_property("Brand", "Acme")
        .with_property("DisplayName", "Runner Deluxe")
        .with_property("Lazy", "later")
}

struct Tagged(&'static str);

impl IndexingModifier for Tagged {
    fn name(&self) -> &str {
        self.0
    }

    fn process(&self, args: &mut ModifierArgs<'_>) -> catalog_search::Result<()> {
        args.add_field(self.0, args.content().name.to_uppercase())
    }
}

struct Exploding;

impl IndexingModifier for Exploding {
    fn name(&self) -> &str {
        "Exploding"
    }

    fn process(&self, _args: &mut ModifierArgs<'_>) -> catalog_search::Result<()> {
        Err(Error::StorageError("price service down".into()))
    }
}

// ============================================================================
// 1. Fixed documents
// ============================================================================

#[test]
fn test_zero_modifiers_plain_output() {
    let augmentor = DocumentAugmentor::from_config(&IndexingConfig::default(), Some(ModifierPipeline::new()));
    let doc = augmentor.serialize_plain(&json!({"id": 1, "name": "x"})).unwrap();
    assert_eq!(doc.body_str(), r#"{"id":1,"name":"x"}"#);
}

#[test]
fn test_single_fragment_splice() {
    let mut out = Vec::new();
    splice(br#"{"id":1}"#, &[fragment(json!({"extra": "y"}))], Formatting::Compact, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), r#"{"id":1,"extra":"y"}"#);
}

#[test]
fn test_content_document_with_modifiers() {
    let pipeline = ModifierPipeline::new().with(Tagged("shout")).with(Tagged("again"));
    let augmentor = DocumentAugmentor::from_config(&IndexingConfig::default(), Some(pipeline));
    let doc = augmentor.serialize_content(&product(), None).unwrap();

    assert_eq!(
        doc.body_str(),
        r#"{"contentLink":"7__catalog","name":"Runner","kind":"product","typeName":"ShoeProduct","parentLink":"3__catalog","Brand":"Acme","shout":"RUNNER","again":"RUNNER"}"#
    );
}

#[test]
fn test_indented_document_parses() {
    let config = IndexingConfig { formatting: Formatting::Indented, ..IndexingConfig::default() };
    let augmentor = DocumentAugmentor::from_config(&config, Some(ModifierPipeline::new().with(Tagged("shout"))));
    let doc = augmentor.serialize_content(&product(), None).unwrap();

    let parsed: JsonValue = serde_json::from_slice(&doc.body).unwrap();
    assert_eq!(parsed["shout"], "RUNNER");
    assert_eq!(parsed["Brand"], "Acme");
    assert!(doc.body_str().ends_with("\n}"));
}

#[test]
fn test_failing_modifier_names_itself_and_content() {
    let pipeline = ModifierPipeline::new().with(Tagged("shout")).with(Exploding);
    let augmentor = DocumentAugmentor::from_config(&IndexingConfig::default(), Some(pipeline));
    let err = augmentor.serialize_content(&product(), None).unwrap_err();

    assert_eq!(err.to_string(), "Exploding failed to process content 7__catalog with name Runner");
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("Storage error: price service down"));
}

#[test]
fn test_strategy_from_config() {
    let config = IndexingConfig { splice_strategy: SpliceStrategy::StructuredMerge, ..IndexingConfig::default() };
    let augmentor = DocumentAugmentor::from_config(&config, Some(ModifierPipeline::new().with(Tagged("name"))));
    let doc = augmentor.serialize_content(&product(), None).unwrap();

    // Structured merge replaces the base key instead of repeating it.
    let parsed: JsonValue = serde_json::from_slice(&doc.body).unwrap();
    assert_eq!(parsed["name"], "RUNNER");
    assert_eq!(doc.body_str().matches("\"name\"").count(), 1);
}

// ============================================================================
// 2. Properties
// ============================================================================

fn json_object(max_len: usize) -> impl Strategy<Value = BTreeMap<String, JsonValue>> {
    let leaf = prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::from),
        any::<i64>().prop_map(JsonValue::from),
        "\\PC{0,12}".prop_map(JsonValue::from),
        // Braces and whitespace inside strings must not confuse the splice.
        "[{} \n\t\"\\\\]{0,6}".prop_map(JsonValue::from),
    ];
    let value = leaf.prop_recursive(2, 12, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(JsonValue::from),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..3)
                .prop_map(|m| JsonValue::Object(m.into_iter().collect())),
        ]
    });
    prop::collection::btree_map("[a-zA-Z_]{1,8}", value, 0..max_len)
}

fn to_fragment(map: BTreeMap<String, JsonValue>) -> Fragment {
    map.into_iter().collect()
}

proptest! {
    #[test]
    fn prop_splice_is_valid_union(
        base in json_object(6),
        fragments in prop::collection::vec(json_object(4), 0..4),
        indented in any::<bool>(),
    ) {
        let formatting = if indented { Formatting::Indented } else { Formatting::Compact };
        let base_bytes = match formatting {
            Formatting::Compact => serde_json::to_vec(&base).unwrap(),
            Formatting::Indented => serde_json::to_vec_pretty(&base).unwrap(),
        };
        let fragments: Vec<Fragment> = fragments.into_iter().map(to_fragment).collect();

        let mut spliced = Vec::new();
        splice(&base_bytes, &fragments, formatting, &mut spliced).unwrap();
        let mut merged = Vec::new();
        structured_merge(&base_bytes, &fragments, formatting, &mut merged).unwrap();

        // Duplicate keys parse as last-wins, which is what the merge does.
        let spliced: JsonValue = serde_json::from_slice(&spliced).unwrap();
        let merged: JsonValue = serde_json::from_slice(&merged).unwrap();
        prop_assert_eq!(&spliced, &merged);

        let mut expected_keys: Vec<&String> = base.keys().chain(fragments.iter().flat_map(|f| f.keys())).collect();
        expected_keys.sort();
        expected_keys.dedup();
        let mut keys: Vec<&String> = spliced.as_object().unwrap().keys().collect();
        keys.sort();
        prop_assert_eq!(keys, expected_keys);
    }

    #[test]
    fn prop_no_contribution_is_byte_identical(base in json_object(6), empties in 0usize..3) {
        let base_bytes = serde_json::to_vec(&base).unwrap();
        let fragments = vec![Fragment::new(); empties];

        let mut out = Vec::new();
        splice(&base_bytes, &fragments, Formatting::Compact, &mut out).unwrap();
        prop_assert_eq!(out, base_bytes);
    }

    #[test]
    fn prop_trailing_whitespace_is_tolerated(
        base in json_object(4),
        extra in json_object(3),
        padding in "[ \n\r\t]{0,4}",
    ) {
        let mut base_bytes = serde_json::to_vec(&base).unwrap();
        base_bytes.extend_from_slice(padding.as_bytes());
        let fragment = to_fragment(extra);

        let mut out = Vec::new();
        splice(&base_bytes, std::slice::from_ref(&fragment), Formatting::Compact, &mut out).unwrap();
        let parsed: JsonValue = serde_json::from_slice(&out).unwrap();
        prop_assert!(parsed.is_object());
        if !fragment.is_empty() {
            prop_assert_eq!(out.last(), Some(&b'}'));
        }
    }
}
