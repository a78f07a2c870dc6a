//! Ancestor resolution over the catalog relation graph.
//!
//! Scoped search ("everything under category X") works by storing every
//! ancestor of a content node on its search document. Ancestors come from two
//! independent relation kinds:
//!
//! ```text
//! variant ─VariantOf─▶ product ─ChildOf─▶ category ─ChildOf─▶ category ...
//!    └──────────────ChildOf──────────────▶ category ...
//! ```
//!
//! plus a structural fallback: a category with no modeled parent relation
//! still has a parent link in the content tree.

use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::model::{ContentKind, ContentObject, ContentRef, RelationEdge, RelationKind};
use crate::storage::{ContentStore, LookupError, RelationGraphSource};
use crate::{Error, Result};

// ============================================================================
// AncestorSet
// ============================================================================

/// Deduplicated set of ancestor references. No ordering guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorSet {
    refs: HashSet<ContentRef>,
}

impl AncestorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the reference was already present.
    pub fn insert(&mut self, content: ContentRef) -> bool {
        self.refs.insert(content)
    }

    pub fn contains(&self, content: &ContentRef) -> bool {
        self.refs.contains(content)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentRef> {
        self.refs.iter()
    }

    /// Sorted copy, for output that must be stable.
    pub fn to_sorted_vec(&self) -> Vec<ContentRef> {
        let mut refs: Vec<ContentRef> = self.refs.iter().cloned().collect();
        refs.sort();
        refs
    }
}

impl FromIterator<ContentRef> for AncestorSet {
    fn from_iter<I: IntoIterator<Item = ContentRef>>(iter: I) -> Self {
        Self { refs: iter.into_iter().collect() }
    }
}

impl IntoIterator for AncestorSet {
    type Item = ContentRef;
    type IntoIter = hashbrown::hash_set::IntoIter<ContentRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.into_iter()
    }
}

// ============================================================================
// AncestorResolver
// ============================================================================

/// Walks the relation graph from a content node up to all of its ancestors.
///
/// Holds no mutable state: every call builds its own result and visited set,
/// so one resolver can serve any number of concurrent callers. Results are
/// never cached here.
#[derive(Debug, Clone)]
pub struct AncestorResolver<R, C> {
    relations: R,
    contents: C,
}

/// Per-call traversal state.
#[derive(Default)]
struct Walk {
    ancestors: AncestorSet,
    /// References whose `ChildOf` chain has already been expanded.
    expanded: HashSet<ContentRef>,
}

impl<R: RelationGraphSource, C: ContentStore> AncestorResolver<R, C> {
    pub fn new(relations: R, contents: C) -> Self {
        Self { relations, contents }
    }

    /// All ancestors of `content`.
    ///
    /// For a variant: every product it belongs to, plus each product's
    /// category chain. For every kind: the node's own category chain, since
    /// variants may also sit directly under a category.
    ///
    /// Terminates on any graph shape, cyclic or not: each reference's chain is
    /// expanded at most once per call.
    pub fn ancestors(&self, content: &ContentObject) -> Result<AncestorSet> {
        let mut walk = Walk::default();

        if content.kind == ContentKind::Variant {
            let products = self
                .lookup(&content.content_ref, RelationKind::VariantOf)?
                .unwrap_or_default();

            for edge in &products {
                let product = edge.owner();
                walk.ancestors.insert(product.clone());
                // Products are never nested in other products, so only the
                // category chain is followed from here.
                self.resolve_chain(product, false, &mut walk)?;
            }
        }

        self.resolve_chain(&content.content_ref, false, &mut walk)?;

        debug!(
            content = %content.content_ref,
            kind = content.kind.name(),
            ancestors = walk.ancestors.len(),
            "Resolved ancestors"
        );
        Ok(walk.ancestors)
    }

    /// Load `content` from the content store and resolve its ancestors.
    pub fn ancestors_of(&self, content: &ContentRef) -> Result<AncestorSet> {
        let loaded = self
            .contents
            .get(content)?
            .ok_or_else(|| Error::NotFound(format!("Content {content}")))?;
        self.ancestors(&loaded)
    }

    /// Expand the `ChildOf` chain above `content` into `walk`.
    ///
    /// With `check_parent_link`, a node that has no modeled parent relation
    /// falls back to its structural parent link.
    fn resolve_chain(
        &self,
        content: &ContentRef,
        check_parent_link: bool,
        walk: &mut Walk,
    ) -> Result<()> {
        if !walk.expanded.insert(content.clone()) {
            trace!(content = %content, "Chain already expanded");
            return Ok(());
        }

        let Some(parents) = self.lookup(content, RelationKind::ChildOf)? else {
            return Ok(());
        };

        for edge in &parents {
            let parent = edge.owner();
            walk.ancestors.insert(parent.clone());
            self.resolve_chain(parent, true, walk)?;
        }

        if check_parent_link && parents.is_empty() {
            if let Some(parent) = self.structural_parent(content)? {
                if walk.ancestors.insert(parent.clone()) {
                    trace!(content = %content, parent = %parent, "Following structural parent link");
                    self.resolve_chain(&parent, true, walk)?;
                }
            }
        }

        Ok(())
    }

    /// Relation lookup in the direction the store indexes `kind` by.
    ///
    /// `Ok(None)` means the reference is not relation-capable: the branch ends
    /// here, it is not an error.
    fn lookup(&self, content: &ContentRef, kind: RelationKind) -> Result<Option<Vec<RelationEdge>>> {
        let found = match kind {
            RelationKind::VariantOf => self.relations.relations_by_target(content, kind),
            RelationKind::ChildOf => self.relations.relations_by_source(content, kind),
        };
        match found {
            Ok(edges) => Ok(Some(edges)),
            Err(LookupError::NotRelationCapable(_)) => {
                trace!(content = %content, ?kind, "Not relation-capable, branch ends");
                Ok(None)
            }
            Err(LookupError::Storage(message)) => Err(Error::StorageError(message)),
        }
    }

    /// Parent link of a catalog node, if the node exists and has one.
    fn structural_parent(&self, content: &ContentRef) -> Result<Option<ContentRef>> {
        Ok(self
            .contents
            .get(content)?
            .filter(|c| c.kind == ContentKind::Node)
            .and_then(|c| c.parent_link))
    }
}

// ============================================================================
// Tests
// ============================================================================
