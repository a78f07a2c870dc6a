//! # Search Documents
//!
//! Turning content objects into the bytes sent to the search engine.
//!
//! ```text
//! ContentObject ─▶ BaseSerializer ─▶ {"contentLink":"12",...}
//!                                              │ trim closing brace
//! ModifierPipeline ─▶ {"extra":"y"} ──────────▶ splice
//!                                              ▼
//!                       {"contentLink":"12",...,"extra":"y"}
//! ```

pub mod base;
pub mod splice;
pub mod augmentor;

use std::io::Write;

use bytes::{Bytes, BytesMut, BufMut};
use serde_json::Value as JsonValue;

use crate::Result;

pub use augmentor::DocumentAugmentor;
pub use base::BaseSerializer;

/// The payload handed to the search-engine client.
///
/// `body` is always a single well-formed JSON object. Sibling documents
/// contributed by modifiers travel with it and are sent after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedDocument {
    pub body: Bytes,
    pub siblings: Vec<Bytes>,
}

impl SerializedDocument {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into(), siblings: Vec::new() }
    }

    pub fn has_siblings(&self) -> bool {
        !self.siblings.is_empty()
    }

    /// Body followed by each sibling, newline-delimited.
    ///
    /// Indented payloads are re-encoded compactly so every line holds
    /// exactly one document.
    pub fn to_ndjson(&self) -> Result<Bytes> {
        let len = self.body.len() + self.siblings.iter().map(|s| s.len() + 1).sum::<usize>() + 1;
        let mut out = BytesMut::with_capacity(len).writer();
        for payload in std::iter::once(&self.body).chain(&self.siblings) {
            write_line(&mut out, payload)?;
        }
        Ok(out.into_inner().freeze())
    }

    /// Body as UTF-8 text (serializers only ever produce UTF-8).
    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }
}

fn write_line<W: Write>(out: &mut W, payload: &[u8]) -> Result<()> {
    if payload.contains(&b'\n') {
        let value: JsonValue = serde_json::from_slice(payload)?;
        serde_json::to_writer(&mut *out, &value)?;
    } else {
        out.write_all(payload)?;
    }
    out.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Formatting, IndexingConfig};
    use crate::modifier::{IndexingModifier, ModifierArgs, ModifierPipeline};
    use crate::model::{ContentKind, ContentObject, ContentRef, ContentType};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_ndjson_layout() {
        let mut doc = SerializedDocument::new(Bytes::from_static(br#"{"a":1}"#));
        assert_eq!(&doc.to_ndjson().unwrap()[..], b"{\"a\":1}\n");

        doc.siblings.push(Bytes::from_static(br#"{"b":2}"#));
        assert!(doc.has_siblings());
        assert_eq!(&doc.to_ndjson().unwrap()[..], b"{\"a\":1}\n{\"b\":2}\n");
    }

    struct WithSibling;

    impl IndexingModifier for WithSibling {
        fn name(&self) -> &str {
            "WithSibling"
        }

        fn process(&self, args: &mut ModifierArgs<'_>) -> crate::Result<()> {
            args.add_field("extra", "y")?;
            let mut sibling = serde_json::Map::new();
            sibling.insert("parent".into(), json!(args.content().content_ref.to_string()));
            sibling.insert("tags".into(), json!(["a", "b"]));
            args.add_sibling(sibling);
            Ok(())
        }
    }

    #[test]
    fn test_ndjson_from_indented_documents() {
        let config = IndexingConfig { formatting: Formatting::Indented, ..IndexingConfig::default() };
        let augmentor = DocumentAugmentor::from_config(&config, Some(ModifierPipeline::new().with(WithSibling)));
        let content = ContentObject::new(ContentRef::new(4), "Boots", ContentKind::Page, Arc::new(ContentType::new("Page")));
        let doc = augmentor.serialize_content(&content, None).unwrap();
        assert!(doc.body.contains(&b'\n'));

        let ndjson = doc.to_ndjson().unwrap();
        let text = std::str::from_utf8(&ndjson).unwrap();
        let lines: Vec<JsonValue> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["extra"], "y");
        assert_eq!(lines[0]["name"], "Boots");
        assert_eq!(lines[1], json!({"parent": "4", "tags": ["a", "b"]}));
    }

    #[test]
    fn test_ndjson_rejects_broken_multiline_payload() {
        let doc = SerializedDocument::new(Bytes::from_static(b"{\n  \"a\": \n"));
        assert!(matches!(doc.to_ndjson(), Err(crate::Error::SerializationError(_))));
    }
}
