//! Base serializer: a content object as a plain JSON document.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::trace;

use crate::config::Formatting;
use crate::fields;
use crate::filter::PropertyFilter;
use crate::model::{ContentObject, ContentType};
use crate::Result;

/// Document fields written for every content object, ahead of its properties.
const BASE_FIELDS: &[&str] = &[
    fields::CONTENT_LINK,
    fields::NAME,
    fields::KIND,
    fields::TYPE_NAME,
    fields::PARENT_LINK,
];

/// Serializes content objects (and any other serde value) to JSON bytes.
///
/// Output is a complete JSON value with no trailing whitespace or newline in
/// either formatting.
#[derive(Debug, Clone)]
pub struct BaseSerializer {
    filter: Arc<PropertyFilter>,
    formatting: Formatting,
}

impl BaseSerializer {
    pub fn new(filter: Arc<PropertyFilter>, formatting: Formatting) -> Self {
        Self { filter, formatting }
    }

    pub fn formatting(&self) -> Formatting {
        self.formatting
    }

    pub fn filter(&self) -> &PropertyFilter {
        &self.filter
    }

    /// Serialize any value exactly as a plain serializer would.
    pub fn to_vec<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(match self.formatting {
            Formatting::Compact => serde_json::to_vec(value)?,
            Formatting::Indented => serde_json::to_vec_pretty(value)?,
        })
    }

    /// Serialize a content object: identity fields, then every indexable
    /// declared property that has a value, in declaration order.
    pub fn serialize_content(&self, content: &ContentObject) -> Result<Vec<u8>> {
        let included = self.filter.included(&content.content_type);
        let document = ContentDocument {
            content,
            declared: content.content_type.declared(),
            included: &included,
        };
        self.to_vec(&document)
    }
}

/// Borrowed view of a content object with its property mapping applied.
struct ContentDocument<'a> {
    content: &'a ContentObject,
    declared: &'a ContentType,
    included: &'a [usize],
}

impl Serialize for ContentDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let content = self.content;
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry(fields::CONTENT_LINK, &content.content_ref)?;
        map.serialize_entry(fields::NAME, &content.name)?;
        map.serialize_entry(fields::KIND, &content.kind)?;
        map.serialize_entry(fields::TYPE_NAME, &self.declared.name)?;
        if let Some(parent) = &content.parent_link {
            map.serialize_entry(fields::PARENT_LINK, parent)?;
        }

        for &position in self.included {
            let Some(property) = self.declared.properties.get(position) else {
                continue;
            };
            if BASE_FIELDS.contains(&property.name.as_str()) {
                trace!(property = property.name.as_str(), "Property shadows a base field, skipped");
                continue;
            }
            if let Some(value) = content.properties.get(&property.name) {
                map.serialize_entry(&property.name, value)?;
            }
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ExclusionRules;
    use crate::model::*;

    fn serializer(formatting: Formatting) -> BaseSerializer {
        BaseSerializer::new(Arc::new(PropertyFilter::new(ExclusionRules::default())), formatting)
    }

    fn article_type() -> Arc<ContentType> {
        Arc::new(
            ContentType::new("ArticlePage")
                .with_property(PropertyDescriptor::new("Title", TypeDescriptor::simple("String")))
                .with_property(
                    PropertyDescriptor::new("Notes", TypeDescriptor::simple("String"))
                        .with_marker(Marker::IndexIgnore),
                )
                .with_property(PropertyDescriptor::new("MainArea", TypeDescriptor::simple("ContentArea")))
                .with_property(PropertyDescriptor::new("Rank", TypeDescriptor::simple("Int"))),
        )
    }

    #[test]
    fn test_content_fields_and_filtering() {
        let content = ContentObject::new(ContentRef::new(12), "Hello", ContentKind::Page, article_type())
            .with_parent(ContentRef::new(1))
            .with_property("Title", "Hello world")
            .with_property("Notes", "internal")
            .with_property("MainArea", "blocks")
            .with_property("Rank", 3)
            .with_property("Undeclared", "dropped");

        let bytes = serializer(Formatting::Compact).serialize_content(&content).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"contentLink":"12","name":"Hello","kind":"page","typeName":"ArticlePage","parentLink":"1","Title":"Hello world","Rank":3}"#
        );
    }

    #[test]
    fn test_proxy_serializes_like_declared() {
        let declared = article_type();
        let proxy = Arc::new(ContentType::proxy("ArticlePageProxy", declared.clone()));
        let plain = ContentObject::new(ContentRef::new(3), "A", ContentKind::Page, declared)
            .with_property("Notes", "secret");
        let proxied = ContentObject { content_type: proxy, ..plain.clone() };

        let s = serializer(Formatting::Compact);
        assert_eq!(s.serialize_content(&plain).unwrap(), s.serialize_content(&proxied).unwrap());
        assert!(!String::from_utf8(s.serialize_content(&proxied).unwrap()).unwrap().contains("secret"));
    }

    #[test]
    fn test_no_trailing_whitespace() {
        let content = ContentObject::new(ContentRef::new(1), "x", ContentKind::Page, article_type());
        for formatting in [Formatting::Compact, Formatting::Indented] {
            let bytes = serializer(formatting).serialize_content(&content).unwrap();
            assert_eq!(bytes.last(), Some(&b'}'));
        }
    }

    #[test]
    fn test_property_cannot_shadow_base_field() {
        let ty = Arc::new(
            ContentType::new("Odd").with_property(PropertyDescriptor::new("name", TypeDescriptor::simple("String"))),
        );
        let content = ContentObject::new(ContentRef::new(1), "real", ContentKind::Page, ty)
            .with_property("name", "shadow");
        let bytes = serializer(Formatting::Compact).serialize_content(&content).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["name"], "real");
    }
}
