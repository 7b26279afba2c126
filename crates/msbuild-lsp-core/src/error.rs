//! Error types for the document engine and its collaborators.
//!
//! Only [`CoreError`] ever reaches a query caller. Evaluation problems become
//! diagnostics on the document, and feed failures are logged and swallowed
//! where the feed is called.

use msbuild_source_map::Span;
use std::path::PathBuf;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Misuse of the engine by its caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A query or mutation named a URI that was never opened (or was closed).
    #[error("Document is not open: {uri}")]
    DocumentNotOpen { uri: String },
}

/// One thing the evaluator found wrong with a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationProblem {
    pub message: String,
    /// Stable code such as `MSE2001`.
    pub code: &'static str,
    pub span: Option<Span>,
}

impl EvaluationProblem {
    pub fn new(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            message: message.into(),
            code,
            span,
        }
    }
}

/// The evaluator could not produce a semantic model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("project evaluation failed: {}", summary(.problems))]
pub struct EvaluationError {
    pub problems: Vec<EvaluationProblem>,
}

impl EvaluationError {
    pub fn new(problems: Vec<EvaluationProblem>) -> Self {
        Self { problems }
    }

    pub fn single(problem: EvaluationProblem) -> Self {
        Self {
            problems: vec![problem],
        }
    }
}

fn summary(problems: &[EvaluationProblem]) -> String {
    match problems {
        [] => "no details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

/// Failures of a package feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read package source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package id: {0:?}")]
    InvalidPackageId(String),

    /// Several sources failed; the individual failures are kept.
    #[error("{} package sources failed", .0.len())]
    Aggregate(Vec<FeedError>),
}
