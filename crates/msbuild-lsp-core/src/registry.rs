//! The collection of open documents and their lifecycle.
//!
//! Each document sits behind its own async reader/writer lock. Mutations
//! (`open`, `load`, `update`, `unload`) take the write lock for their whole
//! duration, including the evaluator call and diagnostic publication, so a
//! query either sees the state before a change or after it, never during.
//! Documents never contend with each other, and the map itself is a
//! [`DashMap`] so inserting a new URI does not lock the others.
//!
//! `unload` publishes the empty set and removes the entry while holding the
//! write lock. A mutation that was queued on the removed handle finds it is
//! no longer the current one once it gets the lock, and starts over on a
//! fresh entry, so its diagnostics always land after the close.

use crate::diagnostics::DiagnosticPublisher;
use crate::document::DocumentState;
use crate::error::{CoreError, Result};
use crate::semantic::Evaluator;
use crate::types::Diagnostic;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

/// Shared handle to one document's state.
pub type DocumentHandle = Arc<RwLock<DocumentState>>;

/// Owns every document the engine knows about.
///
/// Starts empty; [`clear`](Self::clear) drops all entries on shutdown.
pub struct DocumentRegistry {
    documents: DashMap<String, DocumentHandle>,
    evaluator: Arc<dyn Evaluator>,
    publisher: Arc<dyn DiagnosticPublisher>,
}

impl DocumentRegistry {
    pub fn new(evaluator: Arc<dyn Evaluator>, publisher: Arc<dyn DiagnosticPublisher>) -> Self {
        Self {
            documents: DashMap::new(),
            evaluator,
            publisher,
        }
    }

    /// The document for `uri`, created unloaded if it is not known yet.
    ///
    /// Never performs I/O.
    pub fn get_or_create(&self, uri: &str) -> DocumentHandle {
        if let Some(existing) = self.documents.get(uri) {
            return existing.value().clone();
        }
        self.documents
            .entry(uri.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(DocumentState::new(uri))))
            .value()
            .clone()
    }

    /// The document for `uri`, which must already be known.
    pub fn get(&self, uri: &str) -> Result<DocumentHandle> {
        self.documents
            .get(uri)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CoreError::DocumentNotOpen {
                uri: uri.to_string(),
            })
    }

    /// Shared access to a known document.
    pub async fn read(&self, uri: &str) -> Result<OwnedRwLockReadGuard<DocumentState>> {
        let handle = self.get(uri)?;
        Ok(handle.read_owned().await)
    }

    /// Register a document with the editor's text and build it.
    pub async fn open(&self, uri: &str, text: &str, version: Option<i32>) -> Vec<Diagnostic> {
        let mut state = self.write_current(uri).await;
        state.rebuild(text.into(), version, &*self.evaluator).await;
        self.finish(&state, "open").await
    }

    /// Build a document if it has not been built yet, or always when
    /// `reload` is set.
    ///
    /// A loaded document is rebuilt from its current text, so unsaved edits
    /// are kept. A document with no text yet is read from disk; if that
    /// fails the document gets a load diagnostic instead of a snapshot.
    pub async fn load(&self, uri: &str, reload: bool) -> Vec<Diagnostic> {
        let mut state = self.write_current(uri).await;

        if state.is_loaded() && !reload {
            return state.diagnostics().to_vec();
        }

        let text = match state.snapshot() {
            Some(snapshot) => Ok(snapshot.text.clone()),
            None => read_from_disk(&state).await,
        };
        match text {
            Ok(text) => state.rebuild(text, None, &*self.evaluator).await,
            Err(err) => state.fail_load(&err),
        }
        self.finish(&state, "load").await
    }

    /// Replace a known document's text and rebuild it.
    pub async fn update(&self, uri: &str, text: &str, version: Option<i32>) -> Result<Vec<Diagnostic>> {
        let handle = self.get(uri)?;
        let mut state = handle.clone().write_owned().await;
        // Closed while we waited
        if !self.is_current(uri, &handle) {
            return Err(CoreError::DocumentNotOpen {
                uri: uri.to_string(),
            });
        }
        state.rebuild(text.into(), version, &*self.evaluator).await;
        Ok(self.finish(&state, "update").await)
    }

    /// Forget a document and clear its published diagnostics.
    ///
    /// Returns whether the document was known. The empty diagnostic set is
    /// published either way.
    pub async fn unload(&self, uri: &str) -> bool {
        let Ok(handle) = self.get(uri) else {
            self.publisher.publish(uri, Vec::new(), None).await;
            return false;
        };
        let mut state = handle.write().await;
        state.clear();
        self.publisher.publish(uri, Vec::new(), None).await;
        let removed = self
            .documents
            .remove_if(uri, |_, current| Arc::ptr_eq(current, &handle))
            .is_some();
        drop(state);
        debug!(uri, removed, "document unloaded");
        removed
    }

    /// URIs of all known documents.
    pub fn uris(&self) -> Vec<String> {
        self.documents.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Drop every document.
    pub fn clear(&self) {
        self.documents.clear();
    }

    /// Write access to the entry that is in the map once the lock is held.
    async fn write_current(&self, uri: &str) -> OwnedRwLockWriteGuard<DocumentState> {
        loop {
            let handle = self.get_or_create(uri);
            let state = handle.clone().write_owned().await;
            if self.is_current(uri, &handle) {
                return state;
            }
            debug!(uri, "document was unloaded while waiting, retrying");
        }
    }

    fn is_current(&self, uri: &str, handle: &DocumentHandle) -> bool {
        self.documents
            .get(uri)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), handle))
    }

    /// Publish the document's diagnostics while the write lock is still held.
    async fn finish(&self, state: &DocumentState, operation: &str) -> Vec<Diagnostic> {
        let diagnostics = state.diagnostics().to_vec();
        debug!(
            uri = state.uri(),
            operation,
            revision = state.revision(),
            diagnostics = diagnostics.len(),
            "document rebuilt"
        );
        self.publisher
            .publish(state.uri(), diagnostics.clone(), state.version())
            .await;
        diagnostics
    }
}

async fn read_from_disk(state: &DocumentState) -> std::io::Result<Arc<str>> {
    let path = state.path().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not name a local file", state.uri()),
        )
    })?;
    let text = tokio::fs::read_to_string(path).await?;
    Ok(text.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::StaticEvaluator;
    use crate::types::DiagnosticStage;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl DiagnosticPublisher for RecordingPublisher {
        async fn publish(&self, uri: &str, diagnostics: Vec<Diagnostic>, _version: Option<i32>) {
            self.published
                .lock()
                .unwrap()
                .push((uri.to_string(), diagnostics.len()));
        }
    }

    fn registry() -> (DocumentRegistry, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let registry = DocumentRegistry::new(Arc::new(StaticEvaluator::default()), publisher.clone());
        (registry, publisher)
    }

    const PROJECT: &str = "<Project><PropertyGroup><A>1</A></PropertyGroup></Project>";

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let (registry, _) = registry();
        let a = registry.get_or_create("untitled:a");
        let b = registry.get_or_create("untitled:a");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
        assert!(!a.read().await.is_loaded());
    }

    #[tokio::test]
    async fn get_unknown_uri_is_usage_error() {
        let (registry, _) = registry();
        assert!(matches!(
            registry.get("untitled:nope"),
            Err(CoreError::DocumentNotOpen { .. })
        ));
        assert!(registry.update("untitled:nope", PROJECT, None).await.is_err());
    }

    #[tokio::test]
    async fn open_builds_and_publishes() {
        let (registry, publisher) = registry();
        let diagnostics = registry.open("untitled:a", PROJECT, Some(1)).await;
        assert!(diagnostics.is_empty());

        let state = registry.read("untitled:a").await.unwrap();
        assert!(state.snapshot().unwrap().semantics().is_some());
        assert_eq!(
            *publisher.published.lock().unwrap(),
            vec![("untitled:a".to_string(), 0)]
        );
    }

    #[tokio::test]
    async fn load_without_reload_is_a_noop() {
        let (registry, publisher) = registry();
        registry.open("untitled:a", PROJECT, Some(1)).await;
        let revision = registry.read("untitled:a").await.unwrap().revision();

        registry.load("untitled:a", false).await;
        registry.load("untitled:a", false).await;

        let state = registry.read("untitled:a").await.unwrap();
        assert_eq!(state.revision(), revision);
        assert_eq!(state.text(), Some(PROJECT));
        assert_eq!(publisher.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reload_rebuilds_from_current_text() {
        let (registry, _) = registry();
        registry.open("untitled:a", PROJECT, Some(1)).await;
        registry.load("untitled:a", true).await;

        let state = registry.read("untitled:a").await.unwrap();
        assert_eq!(state.revision(), 2);
        assert_eq!(state.text(), Some(PROJECT));
        assert_eq!(state.version(), Some(1));
    }

    #[tokio::test]
    async fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.csproj");
        std::fs::write(&path, PROJECT).unwrap();
        let uri = url::Url::from_file_path(&path).unwrap().to_string();

        let (registry, _) = registry();
        let diagnostics = registry.load(&uri, false).await;
        assert!(diagnostics.is_empty());
        assert_eq!(registry.read(&uri).await.unwrap().text(), Some(PROJECT));
    }

    #[tokio::test]
    async fn unreadable_file_gives_load_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let uri = url::Url::from_file_path(dir.path().join("missing.csproj"))
            .unwrap()
            .to_string();

        let (registry, _) = registry();
        let diagnostics = registry.load(&uri, false).await;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].stage, DiagnosticStage::Load);
        assert!(!registry.read(&uri).await.unwrap().is_loaded());
    }

    #[tokio::test]
    async fn unload_removes_and_clears() {
        let (registry, publisher) = registry();
        registry.open("untitled:a", "<Project>", None).await;
        assert!(registry.unload("untitled:a").await);
        assert!(registry.is_empty());
        assert!(!registry.unload("untitled:a").await);

        let published = publisher.published.lock().unwrap().clone();
        assert_eq!(
            published,
            vec![
                ("untitled:a".to_string(), 1),
                ("untitled:a".to_string(), 0),
                ("untitled:a".to_string(), 0),
            ]
        );
    }

    #[tokio::test]
    async fn reopen_queued_behind_close_publishes_last() {
        let (registry, publisher) = registry();
        let registry = Arc::new(registry);
        registry.open("untitled:a", PROJECT, None).await;

        let guard = registry.read("untitled:a").await.unwrap();
        let close = tokio::spawn({
            let registry = registry.clone();
            async move { registry.unload("untitled:a").await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Still listed until the close gets the lock
        assert_eq!(registry.len(), 1);

        let reopen = tokio::spawn({
            let registry = registry.clone();
            async move { registry.open("untitled:a", "<Project>", Some(2)).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);

        assert!(close.await.unwrap());
        assert_eq!(reopen.await.unwrap().len(), 1);

        let state = registry.read("untitled:a").await.unwrap();
        assert_eq!(state.text(), Some("<Project>"));
        assert_eq!(state.version(), Some(2));
        let published = publisher.published.lock().unwrap().clone();
        assert_eq!(
            published[1..],
            [("untitled:a".to_string(), 0), ("untitled:a".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn update_after_close_is_usage_error() {
        let (registry, _) = registry();
        let registry = Arc::new(registry);
        registry.open("untitled:a", PROJECT, None).await;

        let guard = registry.read("untitled:a").await.unwrap();
        let close = tokio::spawn({
            let registry = registry.clone();
            async move { registry.unload("untitled:a").await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let update = tokio::spawn({
            let registry = registry.clone();
            async move { registry.update("untitled:a", "<Project/>", None).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);

        assert!(close.await.unwrap());
        assert!(matches!(
            update.await.unwrap(),
            Err(CoreError::DocumentNotOpen { .. })
        ));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn update_waits_for_readers() {
        let (registry, _) = registry();
        registry.open("untitled:a", PROJECT, None).await;

        let guard = registry.read("untitled:a").await.unwrap();
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            registry.update("untitled:a", "<Project/>", None),
        )
        .await;
        assert!(blocked.is_err(), "update completed while a reader held the document");
        assert_eq!(guard.text(), Some(PROJECT));
        drop(guard);

        registry.update("untitled:a", "<Project/>", None).await.unwrap();
        assert_eq!(registry.read("untitled:a").await.unwrap().text(), Some("<Project/>"));
    }

    #[tokio::test]
    async fn clear_drops_all_documents() {
        let (registry, _) = registry();
        registry.open("untitled:a", PROJECT, None).await;
        registry.open("untitled:b", PROJECT, None).await;
        let mut uris = registry.uris();
        uris.sort();
        assert_eq!(uris, vec!["untitled:a", "untitled:b"]);
        registry.clear();
        assert!(registry.is_empty());
    }
}
