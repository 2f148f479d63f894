//! LLM provider implementations.
//!
//! Every selector is served by [`OpenAiCompatibleProvider`]. This module
//! builds one per configured [`ProviderKind`] and assembles the
//! [`ProviderRegistry`] the chat pipeline resolves against.

pub mod openai_compat;

use secrecy::SecretString;
use tracing::{debug, info};

use chatrelay_core::llm::box_provider::BoxLlmProvider;
use chatrelay_core::llm::registry::ProviderRegistry;
use chatrelay_types::config::{AppConfig, ProviderSettings};
use chatrelay_types::error::ConfigError;
use chatrelay_types::llm::ProviderKind;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{OpenAiCompatConfig, api_key_env};

/// Create a [`BoxLlmProvider`] for `kind` from its settings and API key.
pub fn create_provider(
    kind: ProviderKind,
    settings: &ProviderSettings,
    api_key: SecretString,
) -> Result<BoxLlmProvider, ConfigError> {
    let config = OpenAiCompatConfig::resolve(kind, settings, api_key);
    let provider = OpenAiCompatibleProvider::new(config).map_err(|e| ConfigError::Provider {
        provider: kind.to_string(),
        message: e.to_string(),
    })?;
    Ok(BoxLlmProvider::new(provider))
}

/// Build the registry from config, reading keys through `secret`.
///
/// Kinds without a key are skipped. The default kind must be constructible.
pub fn build_registry(
    config: &AppConfig,
    secret: impl Fn(&str) -> Option<SecretString>,
) -> Result<ProviderRegistry, ConfigError> {
    let default_kind = config.chat.default_provider;
    let mut registry = ProviderRegistry::new(default_kind);

    for kind in ProviderKind::ALL {
        let settings = config.providers.get(kind);
        let env_var = api_key_env(kind, settings);
        match secret(&env_var) {
            Some(key) => {
                registry.register(kind, create_provider(kind, settings, key)?);
                debug!(provider = %kind, "provider configured");
            }
            None if kind == default_kind => {
                return Err(ConfigError::MissingCredential {
                    provider: kind.to_string(),
                    env_var,
                });
            }
            None => debug!(provider = %kind, env_var = %env_var, "provider skipped, no key"),
        }
    }

    info!(default = %default_kind, providers = ?registry.kinds(), "provider registry ready");
    Ok(registry)
}
