//! Indexing configuration.
//!
//! Fixed at pipeline-build time. Hosts usually deserialize it from their own
//! settings file:
//!
//! ```rust
//! use catalog_search::config::{IndexingConfig, SpliceStrategy};
//!
//! let config = IndexingConfig::from_json_str(r#"{
//!     "index_name": "catalog",
//!     "splice_strategy": "structured_merge",
//!     "excluded_property_names": ["InternalNotes"]
//! }"#).unwrap();
//!
//! assert_eq!(config.index_name, "catalog");
//! assert_eq!(config.splice_strategy, SpliceStrategy::StructuredMerge);
//! assert_eq!(config.ancestors_field, "__ancestors");
//! ```

use serde::{Deserialize, Serialize};

use crate::fields;
use crate::{Error, Result};

/// Output layout of serialized documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formatting {
    #[default]
    Compact,
    Indented,
}

/// How modifier contributions are joined onto the base document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpliceStrategy {
    /// Trim the base document's closing brace and append the contributed
    /// fields as bytes. The base is never re-parsed.
    #[default]
    ByteSplice,
    /// Parse the base into a map, merge contributed keys (later wins), and
    /// serialize once.
    StructuredMerge,
}

/// Configuration for serializing and indexing content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Target index for content documents.
    pub index_name: String,
    pub formatting: Formatting,
    pub splice_strategy: SpliceStrategy,
    /// Field holding a document's ancestor references.
    pub ancestors_field: String,
    /// Extra reserved property names (case-insensitive).
    pub excluded_property_names: Vec<String>,
    /// Extra declared type names that are never indexed.
    pub excluded_type_names: Vec<String>,
    /// Extra generic families treated as deferred/injected wrappers.
    pub deferred_wrapper_families: Vec<String>,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            index_name: "content".to_string(),
            formatting: Formatting::default(),
            splice_strategy: SpliceStrategy::default(),
            ancestors_field: fields::ANCESTORS.to_string(),
            excluded_property_names: Vec::new(),
            excluded_type_names: Vec::new(),
            deferred_wrapper_families: Vec::new(),
        }
    }
}

impl IndexingConfig {
    /// Parse and validate a JSON configuration. Missing keys take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("invalid indexing config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_name.trim().is_empty() {
            return Err(Error::ConfigError("index_name must not be empty".into()));
        }
        if self.ancestors_field.trim().is_empty() {
            return Err(Error::ConfigError("ancestors_field must not be empty".into()));
        }
        if self.excluded_property_names.iter().any(|n| n.trim().is_empty()) {
            return Err(Error::ConfigError("excluded_property_names contains an empty name".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexingConfig::default();
        assert_eq!(config.formatting, Formatting::Compact);
        assert_eq!(config.splice_strategy, SpliceStrategy::ByteSplice);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = IndexingConfig::from_json_str("{}").unwrap();
        assert_eq!(config, IndexingConfig::default());
    }

    #[test]
    fn test_rejects_empty_index_name() {
        let err = IndexingConfig::from_json_str(r#"{"index_name": " "}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_rejects_unknown_strategy() {
        let err = IndexingConfig::from_json_str(r#"{"splice_strategy": "zip"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid indexing config"));
    }

    #[test]
    fn test_formatting_names() {
        let config = IndexingConfig::from_json_str(r#"{"formatting": "indented"}"#).unwrap();
        assert_eq!(config.formatting, Formatting::Indented);
    }
}
