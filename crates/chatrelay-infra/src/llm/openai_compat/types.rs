//! Wire types for the chat-completions protocol.

use serde::{Deserialize, Serialize};

use chatrelay_types::llm::{CompletionRequest, MessageRole, StopReason, Usage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// `POST /chat/completions` body.
///
/// `user` and `transforms` are only present when the backend accepts them.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionBody {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<String>,
}

impl ChatCompletionBody {
    /// Build the wire body. The system prompt becomes the leading message;
    /// an empty `request.model` falls back to `default_model`.
    pub fn from_request(
        request: &CompletionRequest,
        default_model: &str,
        send_extensions: bool,
        stream: bool,
    ) -> Self {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system.as_deref().filter(|s| !s.is_empty()) {
            messages.push(WireMessage {
                role: MessageRole::System.to_string(),
                content: system.to_string(),
            });
        }
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        }));

        let model = if request.model.is_empty() {
            default_model.to_string()
        } else {
            request.model.clone()
        };

        let (user, transforms) = match (&request.extensions, send_extensions) {
            (Some(ext), true) => (ext.user.clone(), ext.transforms.clone()),
            _ => (None, Vec::new()),
        };

        Self {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
            user,
            transforms,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl From<WireUsage> for Usage {
    fn from(u: WireUsage) -> Self {
        Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }
    }
}

/// Non-streaming response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<ResponseChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// One `data:` payload of a streamed response.
#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
    /// Some gateways report failures mid-stream as an `error` object.
    #[serde(default)]
    pub error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

pub fn stop_reason(finish_reason: Option<&str>) -> StopReason {
    finish_reason
        .map(StopReason::from_finish_reason)
        .unwrap_or(StopReason::EndTurn)
}
