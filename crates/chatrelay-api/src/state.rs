//! Application state wiring all services together.
//!
//! AppState pins the generic chat pipeline to the concrete infra
//! implementations (SQLite store, OpenAI-compatible providers, SerpAPI).

use std::path::Path;
use std::sync::Arc;

use chatrelay_core::chat::orchestrator::{ChatOrchestrator, TurnSettings};
use chatrelay_core::chat::prompt::PromptSet;
use chatrelay_core::chat::service::ChatService;
use chatrelay_core::chat::window::HistoryWindow;
use chatrelay_core::llm::registry::ProviderRegistry;
use chatrelay_core::research::WebResearcher;
use chatrelay_core::search::provider::BoxSearchProvider;
use chatrelay_infra::config::{env_secret, load_prompts};
use chatrelay_infra::llm::build_registry;
use chatrelay_infra::search::serpapi::SerpApiClient;
use chatrelay_infra::sqlite::api_key::SqliteApiKeyStore;
use chatrelay_infra::sqlite::chat::SqliteChatRepository;
use chatrelay_infra::sqlite::pool::DatabasePool;
use chatrelay_types::config::{AppConfig, ResearchConfig};

/// Concrete orchestrator pinned to the SQLite store.
pub type ConcreteOrchestrator = ChatOrchestrator<SqliteChatRepository>;

/// Shared application state used by the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub api_keys: SqliteApiKeyStore,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: open the DB, load prompts, build
    /// providers and the optional search backend.
    ///
    /// `config_dir` anchors relative prompt file paths.
    pub async fn init(data_dir: &Path, config: &AppConfig, config_dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_pool = DatabasePool::open_in(data_dir).await?;

        let prompts = load_prompts(&config.prompts, config_dir).await?;
        let registry = build_registry(config, env_secret)?;
        let researcher = build_researcher(&config.research)?;

        Ok(Self::from_parts(db_pool, config, registry, researcher, prompts))
    }

    /// Wire state from already-constructed parts.
    pub fn from_parts(
        db_pool: DatabasePool,
        config: &AppConfig,
        registry: ProviderRegistry,
        researcher: Option<WebResearcher>,
        prompts: PromptSet,
    ) -> Self {
        let chat = Arc::new(ChatService::new(SqliteChatRepository::new(db_pool.clone())));
        let settings = TurnSettings {
            window: HistoryWindow::new(config.chat.history_char_budget, config.chat.history_turn_cap),
            max_tokens: config.chat.max_tokens,
            temperature: config.chat.temperature,
        };
        let orchestrator =
            ChatOrchestrator::new(chat, registry, researcher, Arc::new(prompts), settings);

        Self {
            orchestrator: Arc::new(orchestrator),
            api_keys: SqliteApiKeyStore::new(db_pool.clone()),
            db_pool,
        }
    }
}

/// The research pipeline, when a search key is present.
fn build_researcher(config: &ResearchConfig) -> anyhow::Result<Option<WebResearcher>> {
    let Some(key) = env_secret(&config.api_key_env) else {
        tracing::info!(env_var = %config.api_key_env, "web research disabled, no search key");
        return Ok(None);
    };
    let client = SerpApiClient::new(key, config)?;
    tracing::info!("web research enabled");
    Ok(Some(WebResearcher::new(
        BoxSearchProvider::new(client),
        config.max_queries,
        config.results_per_query,
    )))
}
