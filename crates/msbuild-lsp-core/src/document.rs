//! Per-document state.
//!
//! A [`DocumentState`] is created empty, then filled by a load or update that
//! builds a new [`Snapshot`] from scratch. Text, position index, parse result
//! and semantic index always come from the same build and are swapped in
//! together, so a reader holding the state sees one consistent revision.

use crate::diagnostics::{evaluation_diagnostics, load_diagnostic, parse_diagnostic};
use crate::semantic::{EvaluationRequest, Evaluator, SemanticIndex};
use crate::types::Diagnostic;
use msbuild_source_map::PositionIndex;
use msbuild_xml::SyntaxTree;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything derived from one version of a document's text.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub text: Arc<str>,
    pub index: PositionIndex,
    pub parse: Result<SyntaxTree, msbuild_xml::Error>,
    /// Absent when parsing or evaluation failed.
    pub semantics: Option<SemanticIndex>,
}

impl Snapshot {
    /// The syntax tree, if the text parsed.
    pub fn tree(&self) -> Option<&SyntaxTree> {
        self.parse.as_ref().ok()
    }

    pub fn semantics(&self) -> Option<&SemanticIndex> {
        self.semantics.as_ref()
    }
}

/// State of one document, keyed by URI in the registry.
#[derive(Debug)]
pub struct DocumentState {
    uri: String,
    /// File path behind a `file:` URI.
    path: Option<PathBuf>,
    /// Version number from the client, if it sent one.
    version: Option<i32>,
    /// Bumped on every rebuild.
    revision: u64,
    snapshot: Option<Snapshot>,
    diagnostics: Vec<Diagnostic>,
}

impl DocumentState {
    /// Create an unloaded document.
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let path = file_path(&uri);
        Self {
            uri,
            path,
            version: None,
            revision: 0,
            snapshot: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn version(&self) -> Option<i32> {
        self.version
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether a snapshot has been built.
    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|snapshot| &*snapshot.text)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Parse and evaluate `text`, then replace the snapshot and diagnostics.
    pub(crate) async fn rebuild(
        &mut self,
        text: Arc<str>,
        version: Option<i32>,
        evaluator: &dyn Evaluator,
    ) {
        let index = PositionIndex::new(text.clone());
        let parse = msbuild_xml::parse(&text);
        let mut diagnostics = Vec::new();

        let semantics = match &parse {
            Ok(tree) => {
                let request = EvaluationRequest {
                    path: self.path.as_deref(),
                    text: &text,
                    tree,
                };
                match evaluator.evaluate(request).await {
                    Ok(model) => Some(SemanticIndex::new(model)),
                    Err(err) => {
                        diagnostics.extend(evaluation_diagnostics(&err, &index));
                        None
                    }
                }
            }
            Err(err) => {
                diagnostics.push(parse_diagnostic(err, &index));
                None
            }
        };

        self.snapshot = Some(Snapshot {
            text,
            index,
            parse,
            semantics,
        });
        self.diagnostics = diagnostics;
        if version.is_some() {
            self.version = version;
        }
        self.revision += 1;
    }

    /// Record that the text could not be obtained.
    pub(crate) fn fail_load(&mut self, error: &std::io::Error) {
        self.snapshot = None;
        self.diagnostics = vec![load_diagnostic(self.path.as_deref(), error)];
        self.revision += 1;
    }

    /// Drop everything derived from the text.
    pub(crate) fn clear(&mut self) {
        self.snapshot = None;
        self.diagnostics.clear();
        self.version = None;
    }
}

/// The local path of a `file:` URI.
pub fn file_path(uri: &str) -> Option<PathBuf> {
    url::Url::parse(uri)
        .ok()
        .filter(|url| url.scheme() == "file")
        .and_then(|url| url.to_file_path().ok())
}
