//! Configuration types for chatrelay.
//!
//! `AppConfig` represents the top-level `config.toml`. Every section and
//! field has a default, so an empty (or absent) file is a valid config.
//! Secrets never live here: only the names of the environment variables
//! that hold them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::llm::ProviderKind;

/// Top-level configuration for the chatrelay server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Chat turn settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Provider used when a request does not name one.
    #[serde(default = "default_provider")]
    pub default_provider: ProviderKind,
    /// Character budget for the history window.
    #[serde(default = "default_history_char_budget")]
    pub history_char_budget: usize,
    /// Maximum number of stored messages considered for the window.
    #[serde(default = "default_history_turn_cap")]
    pub history_turn_cap: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f64>,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Primary
}

fn default_history_char_budget() -> usize {
    16_000
}

fn default_history_turn_cap() -> usize {
    100
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            history_char_budget: default_history_char_budget(),
            history_turn_cap: default_history_turn_cap(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

/// Web research settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Environment variable holding the SerpAPI key. Research is disabled
    /// when the variable is unset or empty.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_gl")]
    pub gl: String,
    #[serde(default = "default_hl")]
    pub hl: String,
    #[serde(default = "default_max_queries")]
    pub max_queries: usize,
    #[serde(default = "default_results_per_query")]
    pub results_per_query: u32,
}

fn default_search_key_env() -> String {
    "SERPAPI_KEY".to_string()
}

fn default_gl() -> String {
    "us".to_string()
}

fn default_hl() -> String {
    "en".to_string()
}

fn default_max_queries() -> usize {
    6
}

fn default_results_per_query() -> u32 {
    10
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            gl: default_gl(),
            hl: default_hl(),
            max_queries: default_max_queries(),
            results_per_query: default_results_per_query(),
        }
    }
}

/// A prompt override: inline text, or `{ file = "path" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptSource {
    Inline(String),
    File { file: PathBuf },
}

/// Optional overrides for the built-in prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// System prompt for chat turns.
    #[serde(default)]
    pub system: Option<PromptSource>,
    /// Search query planner.
    #[serde(default)]
    pub planner: Option<PromptSource>,
    /// Single-query rewrite used when planning fails.
    #[serde(default)]
    pub rewrite: Option<PromptSource>,
    /// Research summary bullets.
    #[serde(default)]
    pub summary: Option<PromptSource>,
    /// Conversation title.
    #[serde(default)]
    pub title: Option<PromptSource>,
}

/// Per-provider overrides. Unset fields fall back to the built-in defaults
/// for that provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
}

/// The `[providers.*]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub primary: ProviderSettings,
    #[serde(default)]
    pub secondary: ProviderSettings,
    #[serde(default)]
    pub gemini: ProviderSettings,
    #[serde(default)]
    pub openai: ProviderSettings,
}

impl ProvidersConfig {
    pub fn get(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Primary => &self.primary,
            ProviderKind::Secondary => &self.secondary,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAi => &self.openai,
        }
    }
}
