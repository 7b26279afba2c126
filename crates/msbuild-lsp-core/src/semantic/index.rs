//! Position lookup over a semantic model.

use super::model::{SemanticModel, SemanticObject};
use msbuild_source_map::Span;

/// A semantic model ordered by span for position queries.
#[derive(Debug, Clone, Default)]
pub struct SemanticIndex {
    /// Sorted by start offset; wider spans first when starts are equal.
    objects: Vec<SemanticObject>,
}

impl SemanticIndex {
    pub fn new(model: SemanticModel) -> Self {
        let mut objects = model.objects;
        objects.sort_by_key(|object| {
            let span = object.span();
            (span.start, std::cmp::Reverse(span.length))
        });
        Self { objects }
    }

    /// Objects in source order.
    pub fn objects(&self) -> &[SemanticObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The object with the smallest span containing `offset`.
    ///
    /// Containment is right-closed like the syntax navigator's. When two
    /// candidates are the same size, the earlier one wins.
    pub fn object_at(&self, offset: usize) -> Option<&SemanticObject> {
        self.best(offset, |span| span.contains(offset))
    }

    /// The object with the smallest span enclosing all of `span`.
    ///
    /// This is how a syntax node is matched to its object: an element is
    /// enclosed by its own item, never by the sibling that ends where it
    /// starts.
    pub fn object_enclosing(&self, span: Span) -> Option<&SemanticObject> {
        self.best(span.start, |candidate| candidate.encloses(&span))
    }

    /// The object a syntax node under the cursor stands for.
    ///
    /// An object lying inside `span` and containing `offset` wins, so each
    /// entry of a `;`-separated attribute value answers for itself. Otherwise
    /// this is [`object_enclosing`](Self::object_enclosing).
    pub fn object_for_node(&self, span: Span, offset: usize) -> Option<&SemanticObject> {
        self.best(offset, |candidate| {
            span.encloses(candidate) && candidate.contains(offset)
        })
        .or_else(|| self.object_enclosing(span))
    }

    /// Smallest object satisfying `matches`. Only objects starting at or
    /// before `offset` are considered.
    fn best(&self, offset: usize, matches: impl Fn(&Span) -> bool) -> Option<&SemanticObject> {
        let upper = self
            .objects
            .partition_point(|object| object.span().start <= offset);
        self.objects[..upper]
            .iter()
            .filter(|object| matches(&object.span()))
            .min_by_key(|object| object.span().length)
    }
}

/// Look up the object at `offset`, or nothing when there is no model.
///
/// Documents whose evaluation failed have no index; queries then run in
/// syntax-only mode.
pub fn object_at(index: Option<&SemanticIndex>, offset: usize) -> Option<&SemanticObject> {
    index.and_then(|index| index.object_at(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn property(name: &str, start: usize, end: usize) -> SemanticObject {
        SemanticObject::Property {
            name: name.into(),
            value: String::new(),
            span: Span::from_bounds(start, end),
        }
    }

    fn item(include: &str, start: usize, end: usize) -> SemanticObject {
        SemanticObject::Item {
            item_type: "PackageReference".into(),
            include: include.into(),
            metadata: BTreeMap::new(),
            span: Span::from_bounds(start, end),
        }
    }

    fn name(object: Option<&SemanticObject>) -> Option<&str> {
        match object? {
            SemanticObject::Property { name, .. } => Some(name),
            SemanticObject::Item { include, .. } => Some(include),
            _ => None,
        }
    }

    #[test]
    fn objects_are_sorted_by_start() {
        let index = SemanticIndex::new(SemanticModel::new(vec![
            property("B", 40, 50),
            property("A", 10, 20),
        ]));
        let starts: Vec<_> = index.objects().iter().map(|o| o.span().start).collect();
        assert_eq!(starts, vec![10, 40]);
    }

    #[test]
    fn smallest_containing_span_wins() {
        let index = SemanticIndex::new(SemanticModel::new(vec![
            item("Outer", 0, 100),
            property("Inner", 20, 30),
        ]));
        assert_eq!(name(index.object_at(25)), Some("Inner"));
        assert_eq!(name(index.object_at(50)), Some("Outer"));
        assert_eq!(name(index.object_at(101)), None);
    }

    #[test]
    fn end_offset_is_inside() {
        let index = SemanticIndex::new(SemanticModel::new(vec![property("A", 10, 20)]));
        assert_eq!(name(index.object_at(20)), Some("A"));
        assert_eq!(name(index.object_at(9)), None);
    }

    #[test]
    fn enclosing_skips_adjacent_sibling() {
        let index = SemanticIndex::new(SemanticModel::new(vec![
            property("A", 10, 20),
            property("B", 20, 30),
        ]));
        assert_eq!(name(index.object_enclosing(Span::from_bounds(20, 30))), Some("B"));
        assert_eq!(name(index.object_enclosing(Span::from_bounds(12, 14))), Some("A"));
        assert_eq!(name(index.object_enclosing(Span::from_bounds(15, 25))), None);
    }

    #[test]
    fn node_lookup_prefers_entry_under_cursor() {
        // Two entries sharing one attribute at 10..30
        let index = SemanticIndex::new(SemanticModel::new(vec![
            property("First", 15, 20),
            property("Second", 21, 26),
            item("Outer", 0, 100),
        ]));
        let attribute = Span::from_bounds(10, 30);
        assert_eq!(name(index.object_for_node(attribute, 17)), Some("First"));
        assert_eq!(name(index.object_for_node(attribute, 23)), Some("Second"));
        // Between entries: fall back to what encloses the attribute
        assert_eq!(name(index.object_for_node(attribute, 12)), Some("Outer"));
    }

    #[test]
    fn no_model_means_no_object() {
        assert!(object_at(None, 0).is_none());
        let index = SemanticIndex::default();
        assert!(object_at(Some(&index), 0).is_none());
    }
}
