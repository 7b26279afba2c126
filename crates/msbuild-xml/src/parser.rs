//! Markup parser that builds [`SyntaxTree`] arenas.

use crate::tree::{NodeData, NodeId, SyntaxNode, SyntaxTree};
use crate::{Error, Result};
use msbuild_source_map::Span;
use quick_xml::Reader;
use quick_xml::events::{BytesEnd, BytesStart, Event};

/// Parse a project file into a syntax tree.
///
/// # Example
///
/// ```rust
/// use msbuild_xml::parse;
///
/// let tree = parse("<Project><Target Name=\"Build\" /></Project>").unwrap();
/// let target = tree.child_elements(tree.root()).next().unwrap();
/// assert_eq!(tree.attribute_value_of(target, "name"), Some("Build"));
/// ```
///
/// # Errors
///
/// Returns the first structural or syntax error encountered. There is no
/// error recovery: a malformed document yields no tree.
pub fn parse(content: &str) -> Result<SyntaxTree> {
    XmlParser::new(content).parse()
}

/// Internal parser state.
struct XmlParser<'a> {
    /// The source content being parsed.
    source: &'a str,

    reader: Reader<&'a [u8]>,

    /// Arena under construction. Node 0 is the root element once it exists.
    nodes: Vec<SyntaxNode>,

    /// Open elements, innermost last.
    stack: Vec<NodeId>,
}

impl<'a> XmlParser<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            source,
            reader,
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<SyntaxTree> {
        loop {
            // Position before the event is where the event's text begins
            let event_start = self.reader.buffer_position() as usize;

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    self.check_single_root(event_start)?;
                    let id = self.open_element(&e, event_start)?;
                    self.stack.push(id);
                }
                Ok(Event::End(e)) => {
                    self.close_element(&e)?;
                }
                Ok(Event::Empty(e)) => {
                    self.check_single_root(event_start)?;
                    let id = self.open_element(&e, event_start)?;
                    let end = self.reader.buffer_position() as usize;
                    self.nodes[id.index()].span = Span::from_bounds(event_start, end);
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|err| Error::XmlSyntax {
                        message: format!("Invalid text content: {}", err),
                        position: Some(event_start),
                    })?;
                    // Whitespace between elements carries no meaning here
                    if !text.trim().is_empty() {
                        self.push_text(text.into_owned(), event_start);
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    self.push_text(text, event_start);
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_)) => {}
                Ok(Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position() as usize),
                    });
                }
            }
        }

        if let Some(&open) = self.stack.last() {
            let (name, name_span) = match &self.nodes[open.index()].data {
                NodeData::Element {
                    name, name_span, ..
                } => (name.clone(), *name_span),
                _ => unreachable!("only elements are pushed on the open stack"),
            };
            return Err(Error::UnexpectedEof {
                expected: format!("closing tag </{}>", name),
                span: Some(name_span),
            });
        }

        if self.nodes.is_empty() {
            return Err(Error::EmptyDocument);
        }

        Ok(SyntaxTree::new(self.nodes))
    }

    fn check_single_root(&self, event_start: usize) -> Result<()> {
        if self.stack.is_empty() && !self.nodes.is_empty() {
            let end = self.reader.buffer_position() as usize;
            return Err(Error::MultipleRoots {
                span: Some(Span::from_bounds(event_start, end)),
            });
        }
        Ok(())
    }

    /// Add an element (and its attributes) under the innermost open element.
    ///
    /// The element's span is provisional until its end tag is seen.
    fn open_element(&mut self, e: &BytesStart<'_>, event_start: usize) -> Result<NodeId> {
        let (name, prefix) = split_name(&String::from_utf8_lossy(e.name().as_ref()));
        let name_span = Span::new(event_start + 1, e.name().as_ref().len());

        let parent = self.stack.last().copied();
        let id = self.push_node(
            NodeData::Element {
                name,
                prefix,
                name_span,
            },
            Span::new(event_start, 0),
            parent,
        );

        // Text between '<' and '>' of this tag
        let source = self.source;
        let tag_end = self.reader.buffer_position() as usize;
        let body_start = event_start + 1;
        let body = &source[body_start..tag_end.saturating_sub(1).max(body_start)];
        let mut cursor = e.name().as_ref().len();

        for attr_result in e.attributes() {
            let attr = attr_result?;
            let full_name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|err| Error::XmlSyntax {
                message: format!("Invalid attribute value: {}", err),
                position: Some(event_start),
            })?;

            let (name_span, value_span) = match locate_attribute(body, cursor, &full_name) {
                Some((name_start, value_start, value_end)) => {
                    cursor = value_end;
                    (
                        Span::new(body_start + name_start, full_name.len()),
                        Span::from_bounds(body_start + value_start, body_start + value_end),
                    )
                }
                // quick-xml accepted an attribute we cannot find in the tag text
                None => (name_span, name_span),
            };

            let (name, prefix) = split_name(&full_name);
            self.push_node(
                NodeData::Attribute {
                    name,
                    prefix,
                    name_span,
                    value: value.into_owned(),
                    value_span,
                },
                Span::from_bounds(name_span.start, value_span.end()),
                Some(id),
            );
        }

        Ok(id)
    }

    fn close_element(&mut self, e: &BytesEnd<'_>) -> Result<()> {
        let end_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let (end_local_name, _) = split_name(&end_name);

        let id = self.stack.pop().ok_or_else(|| Error::InvalidStructure {
            message: format!("Unexpected closing tag </{}>", end_name),
            span: None,
        })?;

        let node = &mut self.nodes[id.index()];
        if let NodeData::Element {
            name, name_span, ..
        } = &node.data
            && *name != end_local_name
        {
            return Err(Error::MismatchedEndTag {
                expected: name.clone(),
                found: end_local_name,
                span: Some(*name_span),
            });
        }

        let end = self.reader.buffer_position() as usize;
        node.span = Span::from_bounds(node.span.start, end);
        Ok(())
    }

    fn push_text(&mut self, content: String, event_start: usize) {
        // Text outside the root element is ignored
        let Some(&parent) = self.stack.last() else {
            return;
        };
        let end = self.reader.buffer_position() as usize;
        self.push_node(
            NodeData::Text { content },
            Span::from_bounds(event_start, end),
            Some(parent),
        );
    }

    fn push_node(&mut self, data: NodeData, span: Span, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            data,
            span,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }
}

/// Split `prefix:local` into its local name and optional prefix.
fn split_name(full_name: &str) -> (String, Option<String>) {
    match full_name.split_once(':') {
        Some((prefix, local)) => (local.to_string(), Some(prefix.to_string())),
        None => (full_name.to_string(), None),
    }
}

/// Find `name="value"` inside a tag body, starting the search at `from`.
///
/// Returns `(name_start, value_start, value_end)` relative to `body`; the value
/// range includes its quotes. Quoted values are stepped over, and a match must
/// be preceded by whitespace so that `Include` is not found inside `NoInclude`.
fn locate_attribute(body: &str, from: usize, name: &str) -> Option<(usize, usize, usize)> {
    let bytes = body.as_bytes();
    let skip_ws = |mut pos: usize| {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        pos
    };

    let mut pos = from;
    while pos < bytes.len() {
        match bytes[pos] {
            quote @ (b'"' | b'\'') => {
                // Jump past the closing quote, or give up on an unterminated one
                let rel_end = body.get(pos + 1..)?.find(quote as char)?;
                pos += rel_end + 2;
                continue;
            }
            _ if bytes[pos..].starts_with(name.as_bytes())
                && (pos == 0 || bytes[pos - 1].is_ascii_whitespace()) =>
            {
                let eq = skip_ws(pos + name.len());
                if bytes.get(eq) == Some(&b'=') {
                    let value_start = skip_ws(eq + 1);
                    let value_end = match bytes.get(value_start) {
                        Some(&quote @ (b'"' | b'\'')) => body[value_start + 1..]
                            .find(quote as char)
                            .map_or(bytes.len(), |rel_end| value_start + 1 + rel_end + 1),
                        _ => body[value_start..]
                            .find(|c: char| c.is_whitespace() || c == '/')
                            .map_or(bytes.len(), |rel_end| value_start + rel_end),
                    };
                    return Some((pos, value_start, value_end));
                }
            }
            _ => {}
        }
        pos += 1;
    }
    None
}
