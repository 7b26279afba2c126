//! Positional queries over open documents.
//!
//! Every query takes shared access to one document, so queries run alongside
//! each other but never alongside a rebuild of the same document. A query on
//! a URI that was never opened is a [`CoreError::DocumentNotOpen`]; anything
//! else that goes wrong (no tree, no semantic model, feed failure,
//! cancellation) answers `None` or an empty list.
//!
//! [`CoreError::DocumentNotOpen`]: crate::error::CoreError::DocumentNotOpen

use crate::cancellation::Cancellation;
use crate::completion::{CompletionTarget, completion_context, completion_list};
use crate::document::DocumentState;
use crate::error::Result;
use crate::feed::PackageFeed;
use crate::registry::DocumentRegistry;
use crate::types::{CompletionList, HoverResult, Location, Position, Symbol};
use crate::{definition, hover, symbols};
use std::sync::Arc;
use tokio::sync::OwnedRwLockReadGuard;
use tracing::{debug, warn};

/// Answers hover, completion, outline and definition requests.
pub struct QueryDispatcher {
    registry: Arc<DocumentRegistry>,
    feed: Arc<dyn PackageFeed>,
    page_size: usize,
}

impl QueryDispatcher {
    pub fn new(registry: Arc<DocumentRegistry>, feed: Arc<dyn PackageFeed>, page_size: usize) -> Self {
        Self {
            registry,
            feed,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn hover(
        &self,
        uri: &str,
        position: Position,
        cancel: &Cancellation,
    ) -> Result<Option<HoverResult>> {
        let Some(state) = self.acquire(uri, cancel).await? else {
            return Ok(None);
        };
        Ok(hover::hover(&state, position))
    }

    pub async fn completion(
        &self,
        uri: &str,
        position: Position,
        cancel: &Cancellation,
    ) -> Result<Option<CompletionList>> {
        let context = {
            let Some(state) = self.acquire(uri, cancel).await? else {
                return Ok(None);
            };
            completion_context(&state, position)
        };
        // The document lock is released before the feed is queried
        let Some(context) = context else {
            return Ok(None);
        };

        let lookup = async {
            match &context.target {
                CompletionTarget::PackageIds => self.feed.suggest_ids(&context.prefix).await,
                CompletionTarget::PackageVersions { package_id } => {
                    self.feed.suggest_versions(package_id).await
                }
            }
        };

        let candidates = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(uri, "completion cancelled while waiting for the package feed");
                return Ok(None);
            }
            result = lookup => match result {
                Ok(candidates) => candidates,
                Err(err) => {
                    warn!(uri, error = %err, "package feed failed; returning no completions");
                    Vec::new()
                }
            },
        };

        Ok(Some(completion_list(&context, candidates, self.page_size)))
    }

    pub async fn document_symbols(
        &self,
        uri: &str,
        cancel: &Cancellation,
    ) -> Result<Option<Vec<Symbol>>> {
        let Some(state) = self.acquire(uri, cancel).await? else {
            return Ok(None);
        };
        Ok(symbols::document_symbols(&state))
    }

    pub async fn definition(
        &self,
        uri: &str,
        position: Position,
        cancel: &Cancellation,
    ) -> Result<Option<Vec<Location>>> {
        let Some(state) = self.acquire(uri, cancel).await? else {
            return Ok(None);
        };
        Ok(definition::definition(&state, position))
    }

    /// Shared access to `uri`, or `None` if the query was cancelled before or
    /// while waiting for it.
    async fn acquire(
        &self,
        uri: &str,
        cancel: &Cancellation,
    ) -> Result<Option<OwnedRwLockReadGuard<DocumentState>>> {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let state = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(None),
            state = self.registry.read(uri) => state?,
        };
        if cancel.is_cancelled() {
            return Ok(None);
        }
        Ok(Some(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticPublisher;
    use crate::error::{CoreError, FeedError};
    use crate::semantic::StaticEvaluator;
    use crate::types::Diagnostic;
    use async_trait::async_trait;
    use std::time::Duration;

    struct NoPublisher;

    #[async_trait]
    impl DiagnosticPublisher for NoPublisher {
        async fn publish(&self, _uri: &str, _diagnostics: Vec<Diagnostic>, _version: Option<i32>) {}
    }

    /// A feed that never answers.
    struct StalledFeed;

    #[async_trait]
    impl PackageFeed for StalledFeed {
        async fn suggest_ids(&self, _prefix: &str) -> std::result::Result<Vec<String>, FeedError> {
            std::future::pending().await
        }

        async fn suggest_versions(
            &self,
            _package_id: &str,
        ) -> std::result::Result<Vec<String>, FeedError> {
            std::future::pending().await
        }
    }

    const PROJECT: &str = r#"<Project><ItemGroup><PackageReference Include="Ser" /></ItemGroup></Project>"#;

    async fn dispatcher(feed: Arc<dyn PackageFeed>) -> QueryDispatcher {
        let registry = Arc::new(DocumentRegistry::new(
            Arc::new(StaticEvaluator::default()),
            Arc::new(NoPublisher),
        ));
        registry.open("untitled:a", PROJECT, Some(1)).await;
        QueryDispatcher::new(registry, feed, 20)
    }

    #[tokio::test]
    async fn unknown_uri_is_an_error() {
        let dispatcher = dispatcher(Arc::new(StalledFeed)).await;
        let result = dispatcher
            .hover("untitled:zzz", Position::new(0, 0), &Cancellation::new())
            .await;
        assert!(matches!(result, Err(CoreError::DocumentNotOpen { .. })));
    }

    #[tokio::test]
    async fn cancelled_before_start_answers_none() {
        let dispatcher = dispatcher(Arc::new(StalledFeed)).await;
        let cancel = Cancellation::new();
        cancel.cancel();
        let symbols = dispatcher.document_symbols("untitled:a", &cancel).await.unwrap();
        assert_eq!(symbols, None);
    }

    #[tokio::test]
    async fn cancellation_interrupts_feed_wait() {
        let dispatcher = dispatcher(Arc::new(StalledFeed)).await;
        let cancel = Cancellation::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let offset = PROJECT.find("Ser").unwrap() as u32 + 3;
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            dispatcher.completion("untitled:a", Position::new(0, offset), &cancel),
        )
        .await
        .expect("cancellation should end the query");
        assert_eq!(result.unwrap(), None);
    }

    #[tokio::test]
    async fn page_size_is_at_least_one() {
        let dispatcher = dispatcher(Arc::new(StalledFeed)).await;
        let zero = QueryDispatcher::new(dispatcher.registry.clone(), dispatcher.feed.clone(), 0);
        assert_eq!(zero.page_size(), 1);
    }
}
