//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/conversations               - List the caller's conversations
//! - GET    /api/v1/conversations/{id}/messages - Messages, oldest first
//! - PATCH  /api/v1/conversations/{id}          - Rename
//! - DELETE /api/v1/conversations/{id}          - Delete with its messages
//!
//! Every lookup is scoped to the caller: a conversation owned by someone
//! else is reported as not found.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatrelay_core::chat::service::MAX_TITLE_CHARS;
use chatrelay_types::chat::{ChatMessage, Conversation};

use super::parse_uuid;
use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
    pub deleted: bool,
}

/// GET /api/v1/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Conversation>>>, AppError> {
    let start = Instant::now();
    let conversations = state
        .orchestrator
        .chat()
        .list_conversations(&auth.user_id)
        .await?;
    Ok(Json(ApiResponse::success(conversations, start)))
}

/// GET /api/v1/conversations/{id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let id = parse_uuid(&id)?;
    let messages = state.orchestrator.chat().messages(&id, &auth.user_id).await?;
    Ok(Json(ApiResponse::success(messages, start)))
}

/// PATCH /api/v1/conversations/{id}
pub async fn rename_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Result<Json<ApiResponse<Conversation>>, AppError> {
    let start = Instant::now();
    let id = parse_uuid(&id)?;
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }

    let conversation = state
        .orchestrator
        .chat()
        .rename(&id, &auth.user_id, title)
        .await?;
    Ok(Json(ApiResponse::success(conversation, start)))
}

/// DELETE /api/v1/conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Deleted>>, AppError> {
    let start = Instant::now();
    let id = parse_uuid(&id)?;
    state.orchestrator.chat().delete(&id, &auth.user_id).await?;
    Ok(Json(ApiResponse::success(Deleted { id, deleted: true }, start)))
}
