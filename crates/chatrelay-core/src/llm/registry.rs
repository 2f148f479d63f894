//! Provider registry for runtime provider lookup.
//!
//! Holds one boxed provider per configured [`ProviderKind`] plus the kind
//! used when a request does not name one.

use std::collections::HashMap;
use std::sync::Arc;

use chatrelay_types::llm::{LlmError, ProviderKind};

use super::box_provider::BoxLlmProvider;

/// A resolved provider together with the selector it was resolved from.
#[derive(Debug, Clone)]
pub struct SelectedProvider {
    pub kind: ProviderKind,
    pub provider: Arc<BoxLlmProvider>,
}

/// Registry of constructed LLM providers, indexed by kind.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    default_kind: ProviderKind,
    providers: HashMap<ProviderKind, Arc<BoxLlmProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry with the given default selector.
    pub fn new(default_kind: ProviderKind) -> Self {
        Self {
            default_kind,
            providers: HashMap::new(),
        }
    }

    /// Register a provider under the given kind, replacing any previous one.
    pub fn register(&mut self, kind: ProviderKind, provider: BoxLlmProvider) {
        self.providers.insert(kind, Arc::new(provider));
    }

    pub fn default_kind(&self) -> ProviderKind {
        self.default_kind
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Resolve a requested selector, falling back to the default.
    ///
    /// Fails with [`LlmError::NotConfigured`] when no client exists for the
    /// selector.
    pub fn resolve(&self, requested: Option<ProviderKind>) -> Result<SelectedProvider, LlmError> {
        let kind = requested.unwrap_or(self.default_kind);
        self.providers
            .get(&kind)
            .map(|provider| SelectedProvider {
                kind,
                provider: Arc::clone(provider),
            })
            .ok_or(LlmError::NotConfigured(kind))
    }

    /// Configured kinds in a stable order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
