//! # Storage Collaborators
//!
//! The contracts between the indexer and the stores it reads from.
//! Both stores are owned elsewhere; the indexer only ever reads.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory content + relations for testing/embedding |
//!
//! Lookups are synchronous. Callers indexing many documents parallelize per
//! document, never inside a single lookup chain.

pub mod memory;

use std::sync::Arc;

use crate::model::*;
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// Lookup errors
// ============================================================================

/// Failure of a relation lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The reference is not a node type the relation store models edges for.
    /// Callers walking the graph treat this as "no relations here".
    #[error("{0} is not relation-capable")]
    NotRelationCapable(ContentRef),

    /// The store itself failed.
    #[error("relation store error: {0}")]
    Storage(String),
}

pub type LookupResult<T> = std::result::Result<T, LookupError>;

// ============================================================================
// RelationGraphSource
// ============================================================================

/// Supplies relation edges on demand.
///
/// See [`RelationEdge`] for which endpoint each kind is indexed by.
pub trait RelationGraphSource: Send + Sync {
    /// All edges of `kind` whose target is `target`.
    fn relations_by_target(
        &self,
        target: &ContentRef,
        kind: RelationKind,
    ) -> LookupResult<Vec<RelationEdge>>;

    /// All edges of `kind` whose source is `source`.
    fn relations_by_source(
        &self,
        source: &ContentRef,
        kind: RelationKind,
    ) -> LookupResult<Vec<RelationEdge>>;
}

impl<T: RelationGraphSource + ?Sized> RelationGraphSource for Arc<T> {
    fn relations_by_target(
        &self,
        target: &ContentRef,
        kind: RelationKind,
    ) -> LookupResult<Vec<RelationEdge>> {
        (**self).relations_by_target(target, kind)
    }

    fn relations_by_source(
        &self,
        source: &ContentRef,
        kind: RelationKind,
    ) -> LookupResult<Vec<RelationEdge>> {
        (**self).relations_by_source(source, kind)
    }
}

// ============================================================================
// ContentStore
// ============================================================================

/// Read-only access to content objects.
pub trait ContentStore: Send + Sync {
    /// Load a content object. Returns None if not found.
    fn get(&self, content: &ContentRef) -> Result<Option<ContentObject>>;
}

impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    fn get(&self, content: &ContentRef) -> Result<Option<ContentObject>> {
        (**self).get(content)
    }
}
