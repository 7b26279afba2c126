//! Diagnostics for parse, evaluation and load failures, and their publication.

use crate::error::EvaluationError;
use crate::types::{Diagnostic, DiagnosticSeverity, DiagnosticStage, Range};
use async_trait::async_trait;
use msbuild_source_map::{PositionIndex, Span};
use std::path::Path;

/// A document's text could not be read.
pub const LOAD_FAILED: &str = "MSL3001";

/// Receives the full diagnostic set of a document after every change.
///
/// An empty set clears whatever was published before.
#[async_trait]
pub trait DiagnosticPublisher: Send + Sync {
    async fn publish(&self, uri: &str, diagnostics: Vec<Diagnostic>, version: Option<i32>);
}

/// Diagnostic for a document that failed to parse.
pub fn parse_diagnostic(error: &msbuild_xml::Error, index: &PositionIndex) -> Diagnostic {
    let range = error
        .span()
        .map(|span| span_range(span, index))
        .unwrap_or_default();
    Diagnostic::new(
        range,
        DiagnosticSeverity::Error,
        DiagnosticStage::Parse,
        error.to_string(),
    )
    .with_code(error.code())
}

/// One diagnostic per problem the evaluator reported.
pub fn evaluation_diagnostics(error: &EvaluationError, index: &PositionIndex) -> Vec<Diagnostic> {
    error
        .problems
        .iter()
        .map(|problem| {
            let range = problem
                .span
                .map(|span| span_range(span, index))
                .unwrap_or_default();
            Diagnostic::new(
                range,
                DiagnosticSeverity::Error,
                DiagnosticStage::Evaluate,
                problem.message.clone(),
            )
            .with_code(problem.code)
        })
        .collect()
}

/// Diagnostic for a document whose file could not be read.
pub fn load_diagnostic(path: Option<&Path>, error: &std::io::Error) -> Diagnostic {
    let message = match path {
        Some(path) => format!("Could not read {}: {}", path.display(), error),
        None => format!("Could not read document: {error}"),
    };
    Diagnostic::new(
        Range::default(),
        DiagnosticSeverity::Error,
        DiagnosticStage::Load,
        message,
    )
    .with_code(LOAD_FAILED)
}

/// Range of `span`, snapped into the text so a slightly off error position
/// can never trip the index's boundary checks.
fn span_range(span: Span, index: &PositionIndex) -> Range {
    let text = index.text();
    let start = floor_char_boundary(text, span.start);
    let end = floor_char_boundary(text, span.end()).max(start);
    index.span_to_range(Span::from_bounds(start, end))
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
