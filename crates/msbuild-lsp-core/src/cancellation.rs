//! Per-request cancellation.
//!
//! [`Cancellation`] wraps `tokio_util::sync::CancellationToken` so the query
//! code can both poll it and await it inside `tokio::select!`.

use tokio_util::sync::CancellationToken;

/// A cancellation signal carried by every query.
///
/// Clones share state: cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    inner: CancellationToken,
}

impl Cancellation {
    /// Create a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Request cancellation.
    ///
    /// After this is called, `is_cancelled()` will return `true`.
    pub fn cancel(&self) {
        self.inner.cancel()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await
    }

    /// A token cancelled together with this one, but cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            inner: self.inner.child_token(),
        }
    }
}

impl From<CancellationToken> for Cancellation {
    fn from(token: CancellationToken) -> Self {
        Self { inner: token }
    }
}
