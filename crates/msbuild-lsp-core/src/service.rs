//! The engine's front door: lifecycle notifications and queries.

use crate::cancellation::Cancellation;
use crate::config::ServerConfig;
use crate::diagnostics::DiagnosticPublisher;
use crate::dispatcher::QueryDispatcher;
use crate::error::Result;
use crate::feed::{LocalPackageFeed, PackageFeed};
use crate::registry::DocumentRegistry;
use crate::semantic::{Evaluator, StaticEvaluator};
use crate::types::{CompletionList, HoverResult, Location, Position, Symbol};
use std::sync::Arc;
use tracing::{debug, info};

/// Owns the document registry and the query dispatcher.
///
/// Every lifecycle notification ends with the document's full diagnostic set
/// being published.
pub struct LanguageService {
    registry: Arc<DocumentRegistry>,
    dispatcher: QueryDispatcher,
}

impl LanguageService {
    /// A service using the built-in evaluator and package feed.
    pub fn new(config: &ServerConfig, publisher: Arc<dyn DiagnosticPublisher>) -> Self {
        info!(
            sdk_roots = config.sdk_roots.len(),
            package_sources = config.package_sources.len(),
            "starting language service"
        );
        Self::with_collaborators(
            Arc::new(StaticEvaluator::new(config.sdk_roots.clone())),
            Arc::new(LocalPackageFeed::new(config.package_sources.clone())),
            publisher,
            config.effective_page_size(),
        )
    }

    pub fn with_collaborators(
        evaluator: Arc<dyn Evaluator>,
        feed: Arc<dyn PackageFeed>,
        publisher: Arc<dyn DiagnosticPublisher>,
        page_size: usize,
    ) -> Self {
        let registry = Arc::new(DocumentRegistry::new(evaluator, publisher));
        let dispatcher = QueryDispatcher::new(registry.clone(), feed, page_size);
        Self {
            registry,
            dispatcher,
        }
    }

    pub fn registry(&self) -> &Arc<DocumentRegistry> {
        &self.registry
    }

    pub async fn did_open(&self, uri: &str, text: &str, version: Option<i32>) {
        self.registry.open(uri, text, version).await;
    }

    /// New full text for an open document.
    pub async fn did_change(&self, uri: &str, text: &str, version: Option<i32>) -> Result<()> {
        self.registry.update(uri, text, version).await?;
        Ok(())
    }

    /// Saving re-evaluates, since files the project imports may have changed.
    /// Re-evaluate an open document. Saves for closed documents are ignored.
    pub async fn did_save(&self, uri: &str) {
        if self.registry.get(uri).is_err() {
            debug!(uri, "save for a document that is not open");
            return;
        }
        self.registry.load(uri, true).await;
    }

    pub async fn did_close(&self, uri: &str) {
        if !self.registry.unload(uri).await {
            debug!(uri, "close for a document that was not open");
        }
    }

    pub async fn hover(
        &self,
        uri: &str,
        position: Position,
        cancel: &Cancellation,
    ) -> Result<Option<HoverResult>> {
        self.dispatcher.hover(uri, position, cancel).await
    }

    pub async fn completion(
        &self,
        uri: &str,
        position: Position,
        cancel: &Cancellation,
    ) -> Result<Option<CompletionList>> {
        self.dispatcher.completion(uri, position, cancel).await
    }

    pub async fn document_symbols(
        &self,
        uri: &str,
        cancel: &Cancellation,
    ) -> Result<Option<Vec<Symbol>>> {
        self.dispatcher.document_symbols(uri, cancel).await
    }

    pub async fn definition(
        &self,
        uri: &str,
        position: Position,
        cancel: &Cancellation,
    ) -> Result<Option<Vec<Location>>> {
        self.dispatcher.definition(uri, position, cancel).await
    }

    /// Drop every document.
    pub fn shutdown(&self) {
        info!(documents = self.registry.len(), "language service shutting down");
        self.registry.clear();
    }
}
