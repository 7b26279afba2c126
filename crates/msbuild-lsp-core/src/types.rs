//! Result types shared by the engine and its front ends.
//!
//! These types are:
//! - Transport-agnostic (no LSP protocol dependencies)
//! - Serializable to JSON
//! - Easily convertible to `lsp-types` in the server crate
//!
//! Positions and ranges are re-exported from `msbuild-source-map`; columns are
//! UTF-16 code units, matching the editor protocol.

pub use msbuild_source_map::{Position, Range};
use serde::{Deserialize, Serialize};

/// Diagnostic severity levels, matching LSP DiagnosticSeverity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

/// The lifecycle stage a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStage {
    /// Malformed markup; no syntax tree is available.
    Parse,
    /// Well-formed markup the evaluator rejected; no semantic model.
    Evaluate,
    /// The document text itself could not be obtained.
    Load,
}

/// A problem attached to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    /// Stable code such as `MSX1003`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub message: String,
    pub stage: DiagnosticStage,
}

impl Diagnostic {
    /// Create a new diagnostic with source `msbuild`.
    pub fn new(
        range: Range,
        severity: DiagnosticSeverity,
        stage: DiagnosticStage,
        message: impl Into<String>,
    ) -> Self {
        Self {
            range,
            severity,
            code: None,
            source: Some("msbuild".to_string()),
            message: message.into(),
            stage,
        }
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Symbol kinds used by the outline, numbered like LSP SymbolKind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Module = 2,
    Package = 4,
    Property = 7,
    Field = 8,
    Function = 12,
    Object = 19,
}

/// One outline entry. The outline is flat; grouping is expressed through
/// `container_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

impl Symbol {
    /// Create a new symbol.
    pub fn new(name: impl Into<String>, kind: SymbolKind, range: Range) -> Self {
        Self {
            name: name.into(),
            kind,
            range,
            container_name: None,
        }
    }

    /// Set the container this symbol is grouped under.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container_name = Some(container.into());
        self
    }
}

/// Markdown hover text and the range it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverResult {
    pub contents: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// Completion item kinds, numbered like LSP CompletionItemKind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionItemKind {
    /// A package identifier.
    Module = 9,
    /// A package version.
    Value = 12,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The text this item replaces when accepted: the whole attribute value.
    pub replace_range: Range,
    /// Keeps the feed's ordering in clients that sort by label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_text: Option<String>,
}

/// A page of completion items.
///
/// `is_incomplete` tells the client that more candidates exist and it should
/// ask again as the user keeps typing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionList {
    pub is_incomplete: bool,
    pub items: Vec<CompletionItem>,
}

/// A location in some file, addressed by URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}
