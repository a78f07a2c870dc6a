//! Query helpers: a paged full-text search over indexed content, scoped by
//! ancestor roots and content types, and the mapping of engine hits back to
//! content.

use serde_json::{json, Value as JsonValue};
use tracing::warn;

use crate::fields;
use crate::model::{ContentObject, ContentRef};
use crate::storage::ContentStore;
use crate::Result;

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Aggregation over document types returned with every search.
pub const TYPES_AGGREGATION: &str = "types";

// ============================================================================
// SearchQuery
// ============================================================================

/// Builder for a content search request body.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    text: String,
    page: i64,
    page_size: i64,
    roots: Vec<ContentRef>,
    include_types: Vec<String>,
    exclude_types: Vec<String>,
    ancestors_field: String,
}

impl SearchQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            roots: Vec::new(),
            include_types: Vec::new(),
            exclude_types: Vec::new(),
            ancestors_field: fields::ANCESTORS.to_string(),
        }
    }

    /// One-based page. Pages below 1 read as 1, sizes below 1 as the default.
    pub fn page(mut self, page: i64, page_size: i64) -> Self {
        self.page = if page < 1 { 1 } else { page };
        self.page_size = if page_size < 1 { DEFAULT_PAGE_SIZE } else { page_size };
        self
    }

    /// Only return content at or below these references.
    pub fn under(mut self, roots: impl IntoIterator<Item = ContentRef>) -> Self {
        self.roots.extend(roots);
        self
    }

    pub fn include_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn exclude_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn with_ancestors_field(mut self, field: impl Into<String>) -> Self {
        self.ancestors_field = field.into();
        self
    }

    pub fn page_number(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Offset of the first hit.
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Included types minus excluded ones. Empty means no type filter.
    pub fn searched_types(&self) -> Vec<&str> {
        self.include_types
            .iter()
            .filter(|t| !self.exclude_types.contains(t))
            .map(String::as_str)
            .collect()
    }

    /// The engine request body.
    pub fn to_body(&self) -> JsonValue {
        let mut filters = Vec::new();

        if !self.roots.is_empty() {
            let roots: Vec<String> = self.roots.iter().map(ContentRef::to_string).collect();
            filters.push(json!({
                "bool": {
                    "should": [
                        { "terms": { (self.ancestors_field.as_str()): roots } },
                        { "terms": { (fields::CONTENT_LINK): roots } },
                    ],
                    "minimum_should_match": 1,
                }
            }));
        }

        let types = self.searched_types();
        if !self.include_types.is_empty() {
            filters.push(json!({ "terms": { (fields::TYPE): types } }));
        } else if !self.exclude_types.is_empty() {
            filters.push(json!({
                "bool": { "must_not": [{ "terms": { (fields::TYPE): self.exclude_types } }] }
            }));
        }

        let media_content = format!("{}.content", fields::MEDIA_CONTENTS);
        let media_type = format!("{}.content_type", fields::MEDIA_CONTENTS);
        json!({
            "from": self.skip(),
            "size": self.page_size,
            "stored_fields": [fields::SEARCH_DESCRIPTION, fields::CONTENT_LINK],
            "query": {
                "bool": {
                    "must": [{
                        "simple_query_string": {
                            "query": self.text,
                            "fields": [format!("*{}", fields::ANALYZED_SUFFIX), media_content, media_type],
                            "analyzer": "default",
                        }
                    }],
                    "filter": filters,
                }
            },
            "aggs": {
                (TYPES_AGGREGATION): { "terms": { "field": fields::TYPE } }
            },
        })
    }
}

// ============================================================================
// Hits
// ============================================================================

/// A search hit resolved back to its content.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: ContentRef,
    pub title: String,
    pub summary: String,
}

impl SearchHit {
    /// Stored description first, then the content's own description
    /// property, then empty.
    fn build(content: &ContentObject, stored: Option<&str>) -> Self {
        let summary = stored
            .or_else(|| content.get(fields::SEARCH_DESCRIPTION_PROPERTY).and_then(|v| v.as_str()))
            .unwrap_or_default();
        Self {
            id: content.content_ref.clone(),
            title: content.name.clone(),
            summary: summary.to_string(),
        }
    }
}

/// One page of search hits.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchHitList {
    pub hits: Vec<SearchHit>,
    pub total: u64,
    pub page: i64,
    pub page_size: i64,
    /// Hit count per document type.
    pub types: Vec<(String, u64)>,
}

impl SearchHitList {
    /// Map an engine response to hits. Hits whose id does not parse or whose
    /// content no longer exists are skipped.
    pub fn from_response(response: &JsonValue, query: &SearchQuery, store: &impl ContentStore) -> Result<Self> {
        let hits_section = &response["hits"];
        let total = match &hits_section["total"] {
            JsonValue::Object(total) => total.get("value").and_then(JsonValue::as_u64).unwrap_or(0),
            other => other.as_u64().unwrap_or(0),
        };

        let mut hits = Vec::new();
        for raw in hits_section["hits"].as_array().into_iter().flatten() {
            let Some(id) = raw["_id"].as_str() else {
                warn!("Search hit without an id skipped");
                continue;
            };
            let content_ref = match id.parse::<ContentRef>() {
                Ok(content_ref) => content_ref,
                Err(e) => {
                    warn!(id, error = %e, "Search hit with a foreign id skipped");
                    continue;
                }
            };
            let Some(content) = store.get(&content_ref)? else {
                warn!(content = %content_ref, "Search hit for missing content skipped");
                continue;
            };

            let stored = raw["fields"][fields::SEARCH_DESCRIPTION]
                .as_array()
                .and_then(|values| values.first())
                .and_then(JsonValue::as_str);
            hits.push(SearchHit::build(&content, stored));
        }

        let types = response["aggregations"][TYPES_AGGREGATION]["buckets"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|bucket| Some((bucket["key"].as_str()?.to_string(), bucket["doc_count"].as_u64()?)))
            .collect();

        Ok(Self { hits, total, page: query.page_number(), page_size: query.page_size(), types })
    }
}
