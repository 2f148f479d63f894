//! Conversation title generation handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::{parse_provider, parse_uuid};
use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub title: String,
}

/// POST /api/v1/ai/title - Generate and persist a short title.
pub async fn generate_title(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<TitleRequest>,
) -> Result<Json<ApiResponse<TitleResponse>>, AppError> {
    let start = Instant::now();
    let raw_id = body
        .conversation_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("conversationId is required".to_string()))?;
    let conversation_id = parse_uuid(raw_id)?;
    let provider = parse_provider(body.provider.as_deref())?;

    let title = state
        .orchestrator
        .generate_title(&conversation_id, &auth.user_id, provider)
        .await?;

    Ok(Json(ApiResponse::success(TitleResponse { title }, start)))
}
