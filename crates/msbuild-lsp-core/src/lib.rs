//! Transport-agnostic document engine for project files.
//!
//! This crate keeps open project files parsed, evaluated and indexed, and
//! answers positional queries against them. It has no LSP protocol
//! dependencies; `msbuild-lsp` adapts it to `tower-lsp`.
//!
//! # Architecture
//!
//! ```text
//!   notifications ──► LanguageService ──► DocumentRegistry ──► DocumentState (RwLock)
//!                           │                    │                 └─ Snapshot: text, PositionIndex,
//!                           │                    │                    SyntaxTree | parse error,
//!                           │                    ▼                    SemanticIndex | none
//!                           │              Evaluator, DiagnosticPublisher
//!                           ▼
//!   queries ─────────► QueryDispatcher ──► hover / completion / symbols / definition
//!                                               │
//!                                               ▼
//!                                          PackageFeed
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use msbuild_lsp_core::{Cancellation, LanguageService, Position, ServerConfig};
//!
//! let service = LanguageService::new(&ServerConfig::from_env(), publisher);
//! service.did_open("file:///work/app.csproj", text, Some(1)).await;
//!
//! let hover = service
//!     .hover("file:///work/app.csproj", Position::new(4, 30), &Cancellation::new())
//!     .await?;
//! ```

pub mod cancellation;
pub mod completion;
pub mod config;
pub mod definition;
pub mod diagnostics;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod feed;
pub mod hover;
pub mod registry;
pub mod semantic;
pub mod service;
pub mod symbols;
pub mod types;

// Re-export main types for convenience
pub use cancellation::Cancellation;
pub use config::ServerConfig;
pub use diagnostics::DiagnosticPublisher;
pub use dispatcher::QueryDispatcher;
pub use document::{DocumentState, Snapshot};
pub use error::{CoreError, EvaluationError, EvaluationProblem, FeedError, Result};
pub use feed::{LocalPackageFeed, PackageFeed};
pub use registry::DocumentRegistry;
pub use semantic::{
    EvaluationRequest, Evaluator, SemanticIndex, SemanticModel, SemanticObject, StaticEvaluator,
};
pub use service::LanguageService;
pub use types::{
    CompletionItem, CompletionItemKind, CompletionList, Diagnostic, DiagnosticSeverity,
    DiagnosticStage, HoverResult, Location, Position, Range, Symbol, SymbolKind,
};
