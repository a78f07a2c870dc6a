//! Content nodes and the references that identify them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ContentType, PropertyMap, Value};

/// Separator between the numeric id and the provider in a reference string.
const PROVIDER_SEPARATOR: &str = "__";

/// Opaque content node identifier.
///
/// Content served by an external provider (a commerce catalog, say) carries
/// the provider name so that ids from different stores never collide.
/// Serialized as `"42"` or `"42__catalog"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentRef {
    pub id: u64,
    pub provider: Option<String>,
}

impl ContentRef {
    pub fn new(id: u64) -> Self {
        Self { id, provider: None }
    }

    pub fn with_provider(id: u64, provider: impl Into<String>) -> Self {
        Self { id, provider: Some(provider.into()) }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "{}{PROVIDER_SEPARATOR}{provider}", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Error returned when a reference string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid content reference '{0}'")]
pub struct ParseContentRefError(pub String);

impl FromStr for ContentRef {
    type Err = ParseContentRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, provider) = match s.split_once(PROVIDER_SEPARATOR) {
            Some((id, provider)) if !provider.is_empty() => (id, Some(provider.to_string())),
            Some(_) => return Err(ParseContentRefError(s.to_string())),
            None => (s, None),
        };
        let id = id.parse().map_err(|_| ParseContentRefError(s.to_string()))?;
        Ok(Self { id, provider })
    }
}

impl Serialize for ContentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Structural kind of a content node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Page,
    Media,
    Block,
    /// Catalog category node.
    Node,
    Product,
    Variant,
    Bundle,
}

impl ContentKind {
    /// Whether the relation store models edges for this kind.
    pub fn is_catalog(&self) -> bool {
        matches!(
            self,
            ContentKind::Node | ContentKind::Product | ContentKind::Variant | ContentKind::Bundle
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContentKind::Page => "page",
            ContentKind::Media => "media",
            ContentKind::Block => "block",
            ContentKind::Node => "node",
            ContentKind::Product => "product",
            ContentKind::Variant => "variant",
            ContentKind::Bundle => "bundle",
        }
    }
}

/// A content item as loaded from the content store.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentObject {
    pub content_ref: ContentRef,
    pub name: String,
    pub kind: ContentKind,
    pub content_type: Arc<ContentType>,
    /// Structural parent in the content tree.
    pub parent_link: Option<ContentRef>,
    pub properties: PropertyMap,
}

impl ContentObject {
    pub fn new(
        content_ref: ContentRef,
        name: impl Into<String>,
        kind: ContentKind,
        content_type: Arc<ContentType>,
    ) -> Self {
        Self {
            content_ref,
            name: name.into(),
            kind,
            content_type,
            parent_link: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: ContentRef) -> Self {
        self.parent_link = Some(parent);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
