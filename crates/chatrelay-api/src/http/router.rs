//! Axum router configuration with middleware.
//!
//! All API routes are under `/api/v1/` and require an API key.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chat
        .route("/ai/stream", post(handlers::chat::stream_chat))
        .route("/ai/title", post(handlers::title::generate_title))
        // Conversations
        .route(
            "/conversations",
            get(handlers::conversation::list_conversations),
        )
        .route(
            "/conversations/{id}",
            patch(handlers::conversation::rename_conversation)
                .delete(handlers::conversation::delete_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            get(handlers::conversation::get_messages),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Health check (no auth required).
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let database = sqlx::query("SELECT 1")
        .execute(&state.db_pool.reader)
        .await
        .is_ok();
    let registry = state.orchestrator.registry();
    let providers: Vec<String> = registry.kinds().iter().map(ToString::to_string).collect();

    axum::Json(serde_json::json!({
        "status": if database { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "providers": providers,
        "defaultProvider": registry.default_kind().to_string(),
        "webResearch": state.orchestrator.research_enabled(),
    }))
}
