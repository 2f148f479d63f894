//! Built-in endpoint defaults for each provider selector.
//!
//! Every backend speaks the chat-completions protocol, so a provider is
//! fully described by a base URL, a model, and the environment variable
//! holding its API key. Config overrides any of the three.

use secrecy::SecretString;

use chatrelay_types::config::ProviderSettings;
use chatrelay_types::llm::ProviderKind;

/// Built-in endpoint for a provider selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    pub base_url: &'static str,
    pub api_key_env: &'static str,
    pub model: &'static str,
}

/// Defaults per selector: Groq for `primary`, OpenRouter for `secondary`.
pub fn defaults_for(kind: ProviderKind) -> ProviderDefaults {
    match kind {
        ProviderKind::Primary => ProviderDefaults {
            base_url: "https://api.groq.com/openai/v1",
            api_key_env: "GROQ_API_KEY",
            model: "llama-3.3-70b-versatile",
        },
        ProviderKind::Secondary => ProviderDefaults {
            base_url: "https://openrouter.ai/api/v1",
            api_key_env: "OPENROUTER_API_KEY",
            model: "openai/gpt-4o-mini",
        },
        ProviderKind::Gemini => ProviderDefaults {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
            api_key_env: "GEMINI_API_KEY",
            model: "gemini-2.0-flash",
        },
        ProviderKind::OpenAi => ProviderDefaults {
            base_url: "https://api.openai.com/v1",
            api_key_env: "OPENAI_API_KEY",
            model: "gpt-4o-mini",
        },
    }
}

/// Environment variable holding the key for `kind`, after overrides.
pub fn api_key_env(kind: ProviderKind, settings: &ProviderSettings) -> String {
    settings
        .api_key_env
        .clone()
        .unwrap_or_else(|| defaults_for(kind).api_key_env.to_string())
}

/// Resolved connection settings for one chat-completions endpoint.
///
/// The key is a [`SecretString`]; its `Debug` output is redacted.
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
}

impl OpenAiCompatConfig {
    /// Merge config overrides onto the built-in defaults for `kind`.
    pub fn resolve(kind: ProviderKind, settings: &ProviderSettings, api_key: SecretString) -> Self {
        let defaults = defaults_for(kind);
        let base_url = settings
            .base_url
            .as_deref()
            .unwrap_or(defaults.base_url)
            .trim_end_matches('/')
            .to_string();
        Self {
            kind,
            base_url,
            api_key,
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| defaults.model.to_string()),
        }
    }

    /// `{base_url}/chat/completions`
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}
