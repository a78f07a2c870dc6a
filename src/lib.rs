//! # catalog-search: Search Indexing for Hierarchical Content
//!
//! Turns content (pages, media, catalog categories, products, variants) into
//! search-engine documents.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `RelationGraphSource`, `ContentStore` and `SearchClient`
//!    are the contracts with the outside world
//! 2. **Declared types only**: property exclusion is decided per declared
//!    content type, once, and never from a runtime proxy
//! 3. **Splice, don't re-parse**: modifier output is appended to the base
//!    document's bytes
//! 4. **One bad document fails alone**: errors carry the modifier and content
//!    identity, and a batch keeps going
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use catalog_search::{
//!     AncestorResolver, AncestorsModifier, ContentKind, ContentObject, ContentRef,
//!     ContentType, Indexer, IndexingConfig, MemoryStore, ModifierPipeline,
//! };
//!
//! # async fn example() -> catalog_search::Result<()> {
//! let store = MemoryStore::new();
//! let page = ContentObject::new(
//!     ContentRef::new(12),
//!     "About us",
//!     ContentKind::Page,
//!     Arc::new(ContentType::new("StandardPage")),
//! );
//! store.insert_content(page.clone());
//!
//! let config = IndexingConfig::default();
//! let resolver = AncestorResolver::new(store.clone(), store.clone());
//! let pipeline = ModifierPipeline::new().with(AncestorsModifier::from_config(resolver, &config));
//! let indexer = Indexer::in_memory(config, Some(pipeline))?;
//!
//! let outcome = indexer.index_content(&page, None).await?;
//! assert!(outcome.is_accepted());
//! # Ok(())
//! # }
//! ```
//!
//! ## Collaborators
//!
//! | Trait | In-memory | Description |
//! |-------|-----------|-------------|
//! | `RelationGraphSource` | `MemoryStore` | Variant/product and child/parent edges |
//! | `ContentStore` | `MemoryStore` | Content lookup for the parent-link fallback |
//! | `SearchClient` | `MemorySearchClient` | Accepts or rejects documents |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod ancestors;
pub mod filter;
pub mod config;
pub mod fields;
pub mod modifier;
pub mod document;
pub mod client;
pub mod query;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Blob, ContentKind, ContentObject, ContentRef, ContentType, Marker, PropertyDescriptor,
    PropertyMap, RelationEdge, RelationKind, TypeDescriptor, Value,
};

// ============================================================================
// Re-exports: Storage, resolution, filtering
// ============================================================================

pub use storage::{ContentStore, LookupError, MemoryStore, RelationGraphSource};
pub use ancestors::{AncestorResolver, AncestorSet};
pub use filter::{ExclusionRules, PropertyFilter};
pub use config::{Formatting, IndexingConfig, SpliceStrategy};

// ============================================================================
// Re-exports: Documents and modifiers
// ============================================================================

pub use modifier::{
    AncestorsModifier, IndexingModifier, MediaContentsModifier, ModifierArgs, ModifierPipeline,
    SearchDescriptionModifier,
};
pub use document::{BaseSerializer, DocumentAugmentor, SerializedDocument};

// ============================================================================
// Re-exports: Client and queries
// ============================================================================

pub use client::{IndexCall, IndexOutcome, MemorySearchClient, SearchClient};
pub use query::{SearchHit, SearchHitList, SearchQuery};

use tracing::{debug, info, warn};

// ============================================================================
// Top-level Indexer handle
// ============================================================================

/// The primary entry point. An `Indexer` serializes content through the
/// augmentor and hands the documents to a search client.
pub struct Indexer<S: SearchClient> {
    config: IndexingConfig,
    augmentor: DocumentAugmentor,
    client: S,
}

impl<S: SearchClient> Indexer<S> {
    /// Create an indexer. Fails if `config` is invalid.
    pub fn new(config: IndexingConfig, augmentor: DocumentAugmentor, client: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, augmentor, client })
    }

    /// Serialize `content` and send it to the configured index.
    ///
    /// A modifier failure is returned as an error and nothing is sent.
    pub async fn index_content(
        &self,
        content: &ContentObject,
        pipeline_id: Option<&str>,
    ) -> Result<IndexOutcome> {
        let document = self.augmentor.serialize_content(content, pipeline_id)?;
        let call = IndexCall {
            index: self.config.index_name.clone(),
            type_name: content.content_type.declared().name.clone(),
            id: content.content_ref.to_string(),
            pipeline: pipeline_id.map(str::to_string),
            document,
        };

        let outcome = self.client.index(call).await?;
        if let IndexOutcome::Rejected { reason } = &outcome {
            warn!(content = %content.content_ref, reason = reason.as_str(), "Search engine rejected document");
        } else {
            debug!(content = %content.content_ref, "Indexed content");
        }
        Ok(outcome)
    }

    /// Index every item. A failing item is reported and the batch continues.
    pub async fn index_batch<'a, I>(&self, contents: I, pipeline_id: Option<&str>) -> BatchReport
    where
        I: IntoIterator<Item = &'a ContentObject>,
    {
        let mut report = BatchReport::default();
        for content in contents {
            let content_ref = content.content_ref.clone();
            match self.index_content(content, pipeline_id).await {
                Ok(IndexOutcome::Accepted) => report.accepted.push(content_ref),
                Ok(IndexOutcome::Rejected { reason }) => report.rejected.push((content_ref, reason)),
                Err(e) => {
                    warn!(content = %content_ref, error = %e, "Indexing failed");
                    report.failed.push((content_ref, e));
                }
            }
        }

        info!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            failed = report.failed.len(),
            "Indexed batch"
        );
        report
    }

    /// Run `query` against the configured index and resolve hits through
    /// `store`.
    pub async fn search(&self, query: &SearchQuery, store: &impl ContentStore) -> Result<SearchHitList> {
        let query = query.clone().with_ancestors_field(self.config.ancestors_field.clone());
        let response = self.client.search(&self.config.index_name, &query.to_body()).await?;
        SearchHitList::from_response(&response, &query, store)
    }

    pub fn config(&self) -> &IndexingConfig {
        &self.config
    }

    pub fn augmentor(&self) -> &DocumentAugmentor {
        &self.augmentor
    }

    /// Access the underlying client (for advanced use).
    pub fn client(&self) -> &S {
        &self.client
    }
}

/// In-memory indexer for testing and dry runs.
impl Indexer<MemorySearchClient> {
    pub fn in_memory(config: IndexingConfig, pipeline: Option<ModifierPipeline>) -> Result<Self> {
        let augmentor = DocumentAugmentor::from_config(&config, pipeline);
        Self::new(config, augmentor, MemorySearchClient::new())
    }
}

/// Per-item results of [`Indexer::index_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub accepted: Vec<ContentRef>,
    pub rejected: Vec<(ContentRef, String)>,
    pub failed: Vec<(ContentRef, Error)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty()
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("{modifier} failed to process content {content_id} with name {content_name}")]
    ModifierError {
        modifier: String,
        content_id: ContentRef,
        content_name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Search client error: {0}")]
    ClientError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
