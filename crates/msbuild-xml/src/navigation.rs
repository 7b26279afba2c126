//! Tree walking and offset lookup.
//!
//! All queries here are read-only and never allocate per visited node, so
//! they can run against a shared snapshot from any number of tasks at once.

use crate::tree::{NodeId, SyntaxKind, SyntaxTree};

/// Pre-order iterator over the descendants of a node, excluding the node itself.
///
/// Produced by [`SyntaxTree::descendants`]. Nodes are yielded lazily, so
/// stopping early never walks the rest of the subtree.
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    /// Children still to visit, stored in reverse so `pop` yields source order.
    pending: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.pending.pop()?;
        self.pending
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Iterator from a node's parent up to the root. See [`SyntaxTree::ancestors`].
pub struct Ancestors<'t> {
    tree: &'t SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.parent(id);
        Some(id)
    }
}

impl SyntaxTree {
    /// All nodes below `id` in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            pending: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Parent, grandparent and so on up to the root. Empty for the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// The deepest node under `root` (inclusive) whose span contains `offset`.
    ///
    /// Containment is right-closed: an offset equal to a span's end is still
    /// inside it. Children are tried in source order and the first match wins,
    /// so when one node ends exactly where the next begins, the earlier one is
    /// chosen. This keeps a cursor placed right after a closing quote attached
    /// to the attribute it just finished.
    pub fn find_node_at(&self, root: NodeId, offset: usize) -> Option<NodeId> {
        if !self.span(root).contains(offset) {
            return None;
        }

        let mut current = root;
        'descend: loop {
            for &child in self.children(current) {
                if self.span(child).contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// `id` itself or its closest ancestor whose kind is one of `kinds`.
    pub fn nearest_ancestor_of_kind(&self, id: NodeId, kinds: &[SyntaxKind]) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&node| kinds.contains(&self.kind(node)))
    }

    /// The element or attribute a position inside `id` belongs to.
    ///
    /// Text nodes resolve to their enclosing element.
    pub fn containing_element_or_attribute(&self, id: NodeId) -> Option<NodeId> {
        self.nearest_ancestor_of_kind(id, &[SyntaxKind::Element, SyntaxKind::Attribute])
    }

    /// The element owning `id`: itself if it is an element, else its nearest
    /// element ancestor.
    pub fn enclosing_element(&self, id: NodeId) -> Option<NodeId> {
        self.nearest_ancestor_of_kind(id, &[SyntaxKind::Element])
    }
}
