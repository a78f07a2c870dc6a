//! Relation edges between content nodes.

use serde::{Deserialize, Serialize};
use super::ContentRef;

/// Kind of relation between two content nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Variant membership in a product.
    VariantOf,
    /// Hierarchical containment (node in category, category in category).
    ChildOf,
}

/// A directed relation edge, owned by the external relation store.
///
/// Endpoint orientation follows how the store indexes each kind:
///
/// | Kind | `source` | `target` | Looked up by |
/// |------|----------|----------|--------------|
/// | `VariantOf` | product | variant | target |
/// | `ChildOf` | child | parent | source |
///
/// Use [`RelationEdge::variant_of`] and [`RelationEdge::child_of`] rather than
/// filling the endpoints by hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationEdge {
    pub source: ContentRef,
    pub target: ContentRef,
    pub kind: RelationKind,
}

impl RelationEdge {
    /// `variant` belongs to `product`.
    pub fn variant_of(variant: ContentRef, product: ContentRef) -> Self {
        Self { source: product, target: variant, kind: RelationKind::VariantOf }
    }

    /// `child` is contained in `parent`.
    pub fn child_of(child: ContentRef, parent: ContentRef) -> Self {
        Self { source: child, target: parent, kind: RelationKind::ChildOf }
    }

    /// The containing end of the edge: the product for `VariantOf`,
    /// the parent for `ChildOf`.
    pub fn owner(&self) -> &ContentRef {
        match self.kind {
            RelationKind::VariantOf => &self.source,
            RelationKind::ChildOf => &self.target,
        }
    }

    /// The contained end of the edge.
    pub fn member(&self) -> &ContentRef {
        match self.kind {
            RelationKind::VariantOf => &self.target,
            RelationKind::ChildOf => &self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_orientation() {
        let variant = ContentRef::new(1);
        let product = ContentRef::new(2);
        let category = ContentRef::new(3);

        let membership = RelationEdge::variant_of(variant.clone(), product.clone());
        assert_eq!(membership.owner(), &product);
        assert_eq!(membership.member(), &variant);
        assert_eq!(membership.target, variant);

        let hierarchy = RelationEdge::child_of(product.clone(), category.clone());
        assert_eq!(hierarchy.owner(), &category);
        assert_eq!(hierarchy.member(), &product);
        assert_eq!(hierarchy.source, product);
    }
}
