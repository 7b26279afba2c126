//! Arena-backed syntax tree.

use msbuild_source_map::Span;
use std::fmt::Write as _;

/// Index of a node within its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The fixed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Element,
    Attribute,
    Text,
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element {
        /// Local name, without any namespace prefix.
        name: String,
        prefix: Option<String>,
        /// Span of the (possibly prefixed) name in the start tag.
        name_span: Span,
    },
    Attribute {
        name: String,
        prefix: Option<String>,
        name_span: Span,
        /// Value after entity unescaping.
        value: String,
        /// Span of the value in the source, quotes included.
        value_span: Span,
    },
    Text {
        content: String,
    },
}

/// One node of the tree.
///
/// For elements, `span` runs from the `<` of the start tag to the `>` of the
/// end tag (or of `/>`). For attributes it runs from the name to the closing
/// quote of the value.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub data: NodeData,
    pub span: Span,
    pub parent: Option<NodeId>,
    /// Attributes first, then content, each in source order.
    pub children: Vec<NodeId>,
}

impl SyntaxNode {
    pub fn kind(&self) -> SyntaxKind {
        match self.data {
            NodeData::Element { .. } => SyntaxKind::Element,
            NodeData::Attribute { .. } => SyntaxKind::Attribute,
            NodeData::Text { .. } => SyntaxKind::Text,
        }
    }
}

/// A parsed document. The root element is always node 0.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub(crate) fn new(nodes: Vec<SyntaxNode>) -> Self {
        debug_assert!(!nodes.is_empty(), "a syntax tree always has a root element");
        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind()
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Element name, or `None` if `id` is not an element.
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Attribute name, or `None` if `id` is not an attribute.
    pub fn attribute_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Attribute { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Attribute value, or `None` if `id` is not an attribute.
    pub fn attribute_value(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Attribute { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Span of an attribute's value without its surrounding quotes.
    pub fn attribute_value_inner_span(&self, id: NodeId) -> Option<Span> {
        match &self.node(id).data {
            NodeData::Attribute { value_span, .. } => Some(value_span.trim(1, 1)),
            _ => None,
        }
    }

    /// Attribute children of an element.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of_kind(id, SyntaxKind::Attribute)
    }

    /// Element children of an element.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of_kind(id, SyntaxKind::Element)
    }

    /// Find an attribute of `element` by name, ignoring ASCII case.
    pub fn attribute(&self, element: NodeId, name: &str) -> Option<NodeId> {
        self.attributes(element).find(|&attr| {
            self.attribute_name(attr)
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    /// Value of the named attribute of `element`, ignoring ASCII case.
    pub fn attribute_value_of(&self, element: NodeId, name: &str) -> Option<&str> {
        self.attribute(element, name)
            .and_then(|attr| self.attribute_value(attr))
    }

    /// Concatenated text content directly under `element`, trimmed.
    pub fn text_content(&self, element: NodeId) -> String {
        let mut text = String::new();
        for &child in self.children(element) {
            if let NodeData::Text { content } = &self.node(child).data {
                text.push_str(content);
            }
        }
        text.trim().to_string()
    }

    /// Whether `element` is an element named `name`, ignoring ASCII case.
    pub fn is_element_named(&self, element: NodeId, name: &str) -> bool {
        self.element_name(element)
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    /// Render the tree as an indented outline, one node per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_into(self.root(), 0, &mut out);
        out
    }

    fn outline_into(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        let label = match &node.data {
            NodeData::Element { name, .. } => format!("Element {name}"),
            NodeData::Attribute { name, value, .. } => format!("Attribute {name}={value:?}"),
            NodeData::Text { content } => format!("Text {:?}", content.trim()),
        };
        let _ = writeln!(
            out,
            "{}{} @{}..{}",
            "  ".repeat(depth),
            label,
            node.span.start,
            node.span.end()
        );
        for &child in &node.children {
            self.outline_into(child, depth + 1, out);
        }
    }

    fn children_of_kind(&self, id: NodeId, kind: SyntaxKind) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) == kind)
    }
}
