//! Modifiers shipped with the crate.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

use crate::ancestors::AncestorResolver;
use crate::config::IndexingConfig;
use crate::fields;
use crate::model::ContentKind;
use crate::storage::{ContentStore, RelationGraphSource};
use crate::Result;
use super::{IndexingModifier, ModifierArgs};

// ============================================================================
// Ancestors
// ============================================================================

/// Writes every ancestor of the content into one field, so that search can
/// be scoped to a category or product with a single terms filter.
pub struct AncestorsModifier<R, C> {
    resolver: AncestorResolver<R, C>,
    field: String,
}

impl<R: RelationGraphSource, C: ContentStore> AncestorsModifier<R, C> {
    pub fn new(resolver: AncestorResolver<R, C>) -> Self {
        Self { resolver, field: fields::ANCESTORS.to_string() }
    }

    /// Writes into `config.ancestors_field`, the field `Indexer::search`
    /// scopes on.
    pub fn from_config(resolver: AncestorResolver<R, C>, config: &IndexingConfig) -> Self {
        Self::new(resolver).with_field(config.ancestors_field.clone())
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl<R: RelationGraphSource, C: ContentStore> IndexingModifier for AncestorsModifier<R, C> {
    fn name(&self) -> &str {
        "AncestorsModifier"
    }

    fn process(&self, args: &mut ModifierArgs<'_>) -> Result<()> {
        let ancestors = self.resolver.ancestors(args.content())?;
        args.add_field(self.field.clone(), ancestors.to_sorted_vec())
    }
}

// ============================================================================
// Media contents
// ============================================================================

/// Ships the binary payload of media content, base64 encoded, for the search
/// engine's attachment extraction.
pub struct MediaContentsModifier {
    property: String,
}

impl MediaContentsModifier {
    /// `property` names the content property holding the media blob.
    pub fn new(property: impl Into<String>) -> Self {
        Self { property: property.into() }
    }
}

impl Default for MediaContentsModifier {
    fn default() -> Self {
        Self::new("BinaryData")
    }
}

impl IndexingModifier for MediaContentsModifier {
    fn name(&self) -> &str {
        "MediaContentsModifier"
    }

    fn process(&self, args: &mut ModifierArgs<'_>) -> Result<()> {
        let content = args.content();
        if content.kind != ContentKind::Media {
            return Ok(());
        }
        let Some(blob) = content.get(&self.property).and_then(|v| v.as_blob()) else {
            return Ok(());
        };

        args.add_field(
            fields::MEDIA_CONTENTS,
            json!({
                "content": STANDARD.encode(&blob.data),
                "content_type": blob.mime_type,
                "content_length": blob.data.len(),
            }),
        )
    }
}

// ============================================================================
// Search description
// ============================================================================

/// Stores a short description used as the summary of search hits.
pub struct SearchDescriptionModifier {
    property: String,
}

impl SearchDescriptionModifier {
    pub fn new(property: impl Into<String>) -> Self {
        Self { property: property.into() }
    }
}

impl Default for SearchDescriptionModifier {
    fn default() -> Self {
        Self::new(fields::SEARCH_DESCRIPTION_PROPERTY)
    }
}

impl IndexingModifier for SearchDescriptionModifier {
    fn name(&self) -> &str {
        "SearchDescriptionModifier"
    }

    fn process(&self, args: &mut ModifierArgs<'_>) -> Result<()> {
        match args.content().get(&self.property).and_then(|v| v.as_str()) {
            Some(description) if !description.trim().is_empty() => {
                args.add_field(fields::SEARCH_DESCRIPTION, description.trim())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::model::{Blob, ContentObject, ContentRef, ContentType, RelationEdge};
    use crate::modifier::ModifierPipeline;
    use crate::storage::MemoryStore;

    fn object(id: u64, kind: ContentKind) -> ContentObject {
        ContentObject::new(ContentRef::new(id), format!("c{id}"), kind, Arc::new(ContentType::new("T")))
    }

    #[test]
    fn test_ancestors_field() {
        let store = MemoryStore::new();
        store.insert_content(object(1, ContentKind::Variant));
        store.insert_content(object(2, ContentKind::Product));
        store.insert_content(object(3, ContentKind::Node));
        store.add_relation(RelationEdge::variant_of(ContentRef::new(1), ContentRef::new(2))).unwrap();
        store.add_relation(RelationEdge::child_of(ContentRef::new(2), ContentRef::new(3))).unwrap();

        let modifier = AncestorsModifier::new(AncestorResolver::new(store.clone(), store.clone()));
        let pipeline = ModifierPipeline::new().with(modifier);
        let contributions = pipeline.run(&object(1, ContentKind::Variant), None).unwrap();

        assert_eq!(contributions.fields[0][fields::ANCESTORS], json!(["2", "3"]));
    }

    #[test]
    fn test_ancestors_field_empty_for_root() {
        let store = MemoryStore::new();
        store.insert_content(object(1, ContentKind::Page));

        let modifier = AncestorsModifier::new(AncestorResolver::new(store.clone(), store))
            .with_field("scopes");
        let contributions = ModifierPipeline::new().with(modifier).run(&object(1, ContentKind::Page), None).unwrap();

        assert_eq!(contributions.fields[0]["scopes"], json!([]));
    }

    #[test]
    fn test_ancestors_field_from_config() {
        let store = MemoryStore::new();
        store.insert_content(object(1, ContentKind::Product));
        store.insert_content(object(2, ContentKind::Node));
        store.add_relation(RelationEdge::child_of(ContentRef::new(1), ContentRef::new(2))).unwrap();

        let config = IndexingConfig::from_json_str(r#"{"ancestors_field": "scopes"}"#).unwrap();
        let modifier = AncestorsModifier::from_config(AncestorResolver::new(store.clone(), store.clone()), &config);
        assert_eq!(modifier.field(), "scopes");

        let contributions = ModifierPipeline::new().with(modifier).run(&object(1, ContentKind::Product), None).unwrap();
        assert_eq!(contributions.fields[0]["scopes"], json!(["2"]));
        assert!(contributions.fields[0].get(fields::ANCESTORS).is_none());
    }

    #[test]
    fn test_media_contents_encoded() {
        let media = object(5, ContentKind::Media)
            .with_property("BinaryData", Blob::new("text/plain", b"hello".to_vec()));
        let contributions = ModifierPipeline::new()
            .with(MediaContentsModifier::default())
            .run(&media, None)
            .unwrap();

        let field = &contributions.fields[0][fields::MEDIA_CONTENTS];
        assert_eq!(field["content"], json!("aGVsbG8="));
        assert_eq!(field["content_type"], json!("text/plain"));
        assert_eq!(field["content_length"], json!(5));
    }

    #[test]
    fn test_media_contents_skips_non_media() {
        let page = object(5, ContentKind::Page)
            .with_property("BinaryData", Blob::new("text/plain", b"x".to_vec()));
        let contributions = ModifierPipeline::new()
            .with(MediaContentsModifier::default())
            .run(&page, None)
            .unwrap();
        assert!(contributions.is_empty());
    }

    #[test]
    fn test_search_description() {
        let page = object(7, ContentKind::Page).with_property("SearchDescription", "  Short summary ");
        let blank = object(8, ContentKind::Page).with_property("SearchDescription", "   ");
        let pipeline = ModifierPipeline::new().with(SearchDescriptionModifier::default());

        let contributions = pipeline.run(&page, None).unwrap();
        assert_eq!(contributions.fields[0][fields::SEARCH_DESCRIPTION], json!("Short summary"));
        assert!(pipeline.run(&blank, None).unwrap().is_empty());
    }
}
