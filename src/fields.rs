//! Well-known search document field names.

/// Ancestor references of a document (default name; configurable).
pub const ANCESTORS: &str = "__ancestors";

/// Extracted media payload, with `content` and `content_type` sub-fields.
pub const MEDIA_CONTENTS: &str = "__mediaContents";

/// Short description shown on search hits.
pub const SEARCH_DESCRIPTION: &str = "__searchDescription";

/// Content property a description is read from when none is stored.
pub const SEARCH_DESCRIPTION_PROPERTY: &str = "SearchDescription";

// Base document fields written for every content object.
pub const CONTENT_LINK: &str = "contentLink";
pub const NAME: &str = "name";
pub const KIND: &str = "kind";
pub const PARENT_LINK: &str = "parentLink";
pub const TYPE_NAME: &str = "typeName";

/// Engine-side document type field, used for type filters and aggregations.
pub const TYPE: &str = "_type";

/// Suffix of analyzed full-text sub-fields.
pub const ANALYZED_SUFFIX: &str = ".analyzed";
