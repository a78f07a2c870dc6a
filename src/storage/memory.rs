//! In-memory content and relation store.
//!
//! This is the reference implementation of `RelationGraphSource` and
//! `ContentStore`. It uses hash maps protected by RwLock, with one adjacency
//! index per edge endpoint so both lookup directions are a single probe.
//!
//! ## Limitations
//!
//! - **No persistence**: everything lives in process memory.
//! - **Per-collection locks**: a multi-step mutation is not atomic with
//!   respect to concurrent readers. Safe for read-heavy use.
//!
//! Relation lookups follow commerce-store semantics: asking for the edges of
//! a reference that is unknown, or whose kind is not a catalog kind, fails
//! with [`LookupError::NotRelationCapable`].

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::model::*;
use crate::{Error, Result};
use super::{ContentStore, LookupError, LookupResult, RelationGraphSource};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory content + relation storage. Cloning shares the same store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    contents: RwLock<HashMap<ContentRef, ContentObject>>,
    edges: RwLock<Vec<RelationEdge>>,
    /// (source, kind) → positions in `edges`
    by_source: RwLock<HashMap<(ContentRef, RelationKind), Vec<usize>>>,
    /// (target, kind) → positions in `edges`
    by_target: RwLock<HashMap<(ContentRef, RelationKind), Vec<usize>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a content object.
    pub fn insert_content(&self, content: ContentObject) {
        self.inner.contents.write().insert(content.content_ref.clone(), content);
    }

    /// Add a relation edge. Both endpoints must already exist.
    pub fn add_relation(&self, edge: RelationEdge) -> Result<()> {
        {
            let contents = self.inner.contents.read();
            if !contents.contains_key(&edge.source) {
                return Err(Error::NotFound(format!("Source content {}", edge.source)));
            }
            if !contents.contains_key(&edge.target) {
                return Err(Error::NotFound(format!("Target content {}", edge.target)));
            }
        }

        let mut edges = self.inner.edges.write();
        if edges.contains(&edge) {
            return Ok(());
        }
        let position = edges.len();
        self.inner
            .by_source
            .write()
            .entry((edge.source.clone(), edge.kind))
            .or_default()
            .push(position);
        self.inner
            .by_target
            .write()
            .entry((edge.target.clone(), edge.kind))
            .or_default()
            .push(position);
        edges.push(edge);
        Ok(())
    }

    pub fn content_count(&self) -> usize {
        self.inner.contents.read().len()
    }

    pub fn relation_count(&self) -> usize {
        self.inner.edges.read().len()
    }

    /// Catalog kinds only; anything else cannot own relations.
    fn ensure_relation_capable(&self, content: &ContentRef) -> LookupResult<()> {
        match self.inner.contents.read().get(content) {
            Some(c) if c.kind.is_catalog() => Ok(()),
            _ => Err(LookupError::NotRelationCapable(content.clone())),
        }
    }

    fn collect(
        &self,
        index: &RwLock<HashMap<(ContentRef, RelationKind), Vec<usize>>>,
        key: (ContentRef, RelationKind),
    ) -> Vec<RelationEdge> {
        // Same lock order as `add_relation`: edges, then index.
        let edges = self.inner.edges.read();
        let index = index.read();
        index
            .get(&key)
            .map(|positions| positions.iter().filter_map(|&i| edges.get(i).cloned()).collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Trait impls
// ============================================================================

impl RelationGraphSource for MemoryStore {
    fn relations_by_target(
        &self,
        target: &ContentRef,
        kind: RelationKind,
    ) -> LookupResult<Vec<RelationEdge>> {
        self.ensure_relation_capable(target)?;
        Ok(self.collect(&self.inner.by_target, (target.clone(), kind)))
    }

    fn relations_by_source(
        &self,
        source: &ContentRef,
        kind: RelationKind,
    ) -> LookupResult<Vec<RelationEdge>> {
        self.ensure_relation_capable(source)?;
        Ok(self.collect(&self.inner.by_source, (source.clone(), kind)))
    }
}

impl ContentStore for MemoryStore {
    fn get(&self, content: &ContentRef) -> Result<Option<ContentObject>> {
        Ok(self.inner.contents.read().get(content).cloned())
    }
}

// ============================================================================
// Tests
// ============================================================================
