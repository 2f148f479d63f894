//! SSE chat streaming handler.
//!
//! `POST /api/v1/ai/stream` validates the request, starts the turn (which
//! persists the user message and opens the provider stream), then relays
//! [`TurnEvent`]s as named SSE events. Failures before the stream opens are
//! plain JSON error responses; failures after it opens arrive in-band as a
//! terminal `error` event.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::header::{CACHE_CONTROL, CONNECTION};
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;

use chatrelay_core::chat::orchestrator::TurnRequest;
use chatrelay_types::chat::TurnEvent;

use super::{parse_provider, parse_uuid};
use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Request body for the chat stream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChatRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub web_search: bool,
    #[serde(default)]
    pub provider: Option<String>,
}

/// Render one turn event as a named SSE event whose data is the JSON event.
fn to_sse_event(event: &TurnEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "message": format!("serialization failed: {e}") })
            .to_string()
    });
    Event::default().event(event.name()).data(data)
}

/// POST /api/v1/ai/stream
pub async fn stream_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<StreamChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let conversation_id = body
        .conversation_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_uuid)
        .transpose()?;
    let provider = parse_provider(body.provider.as_deref())?;

    let turn = state
        .orchestrator
        .start_turn(TurnRequest {
            user_id: auth.user_id,
            conversation_id,
            message: body.message,
            web_search: body.web_search,
            provider,
        })
        .await?;

    tracing::info!(conversation_id = %turn.conversation_id, "chat stream opened");

    let events = turn
        .events
        .map(|event| Ok::<_, Infallible>(to_sse_event(&event)));
    let sse = Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)));

    Ok((
        [
            (CACHE_CONTROL, "no-cache, no-transform"),
            (CONNECTION, "keep-alive"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        sse,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_request_body_defaults() {
        let body: StreamChatRequest = serde_json::from_str(r#"{"message":"Hello"}"#).unwrap();
        assert_eq!(body.message, "Hello");
        assert!(!body.web_search);
        assert!(body.conversation_id.is_none());

        let body: StreamChatRequest = serde_json::from_str(
            r#"{"conversationId":"abc","message":"x","webSearch":true,"provider":"secondary"}"#,
        )
        .unwrap();
        assert!(body.web_search);
        assert_eq!(body.conversation_id.as_deref(), Some("abc"));
        assert_eq!(body.provider.as_deref(), Some("secondary"));
    }

    #[test]
    fn test_sse_event_data_is_typed_json() {
        let id = Uuid::now_v7();
        let data = serde_json::to_value(TurnEvent::Done { conversation_id: id }).unwrap();
        assert_eq!(data["type"], "done");
        assert_eq!(data["conversationId"], id.to_string());
        // Building the event must not panic for any variant.
        let _ = to_sse_event(&TurnEvent::Delta { delta: "line\nbreak".to_string() });
    }
}
