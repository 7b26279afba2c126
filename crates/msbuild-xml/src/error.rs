//! Error types for markup parsing with source locations.

use msbuild_source_map::Span;

/// Result type alias for msbuild-xml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing a project file.
///
/// Every variant maps to a stable diagnostic code (see [`Error::code`]) and,
/// where the parser knows it, the span of the offending text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Syntax error reported by quick-xml.
    #[error("XML syntax error: {message}")]
    XmlSyntax {
        message: String,
        /// Byte offset where the error was detected.
        position: Option<usize>,
    },

    /// Input ended while elements were still open.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String, span: Option<Span> },

    /// An end tag that does not close the innermost open element.
    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag {
        expected: String,
        found: String,
        span: Option<Span>,
    },

    #[error("Invalid XML structure: {message}")]
    InvalidStructure { message: String, span: Option<Span> },

    /// No root element at all.
    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    #[error("Invalid XML: multiple root elements")]
    MultipleRoots { span: Option<Span> },
}

impl Error {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::XmlSyntax { .. } => "MSX1001",
            Error::UnexpectedEof { .. } => "MSX1002",
            Error::MismatchedEndTag { .. } => "MSX1003",
            Error::InvalidStructure { .. } => "MSX1004",
            Error::EmptyDocument => "MSX1005",
            Error::MultipleRoots { .. } => "MSX1006",
        }
    }

    /// Where in the text the problem was found, if known.
    ///
    /// Syntax errors only carry a position, so they yield an empty span there.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::XmlSyntax { position, .. } => position.map(|pos| Span::new(pos, 0)),
            Error::UnexpectedEof { span, .. }
            | Error::MismatchedEndTag { span, .. }
            | Error::InvalidStructure { span, .. }
            | Error::MultipleRoots { span } => *span,
            Error::EmptyDocument => None,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlSyntax {
            message: err.to_string(),
            position: None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlSyntax {
            message: format!("Attribute error: {}", err),
            position: None,
        }
    }
}
