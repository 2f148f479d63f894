//! SearchProvider trait and its type-erased wrapper.
//!
//! Mirrors the `LlmProvider` / `BoxLlmProvider` split: concrete backends
//! implement the RPITIT trait, and `BoxSearchProvider` makes them usable
//! behind dynamic dispatch.

use std::future::Future;
use std::pin::Pin;

use chatrelay_types::research::{SearchError, SearchMode, WebResult};

/// A web search backend.
///
/// Implementations live in chatrelay-infra (e.g. `SerpApiClient`).
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Run one query and return up to `limit` raw results.
    fn search(
        &self,
        query: &str,
        mode: SearchMode,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<WebResult>, SearchError>> + Send;
}

/// Object-safe version of [`SearchProvider`] with boxed futures.
pub trait SearchProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
        mode: SearchMode,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<WebResult>, SearchError>> + Send + 'a>>;
}

impl<T: SearchProvider> SearchProviderDyn for T {
    fn name(&self) -> &str {
        SearchProvider::name(self)
    }

    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
        mode: SearchMode,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<WebResult>, SearchError>> + Send + 'a>> {
        Box::pin(self.search(query, mode, limit))
    }
}

/// Type-erased search backend.
pub struct BoxSearchProvider {
    inner: Box<dyn SearchProviderDyn + Send + Sync>,
}

impl BoxSearchProvider {
    pub fn new<T: SearchProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        limit: u32,
    ) -> Result<Vec<WebResult>, SearchError> {
        self.inner.search_boxed(query, mode, limit).await
    }
}
