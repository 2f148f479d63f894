//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves every selector (Groq,
//! OpenRouter, Gemini's OpenAI endpoint, OpenAI itself) via configurable
//! base URLs. Requests are plain reqwest calls so gateway passthrough
//! fields (`user`, `transforms`) can ride along in the body.

pub mod config;
pub mod streaming;
pub mod types;

use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::debug;

use chatrelay_core::llm::provider::{LlmProvider, LlmStream};
use chatrelay_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use self::config::OpenAiCompatConfig;
use self::streaming::create_stream;
use self::types::{ChatCompletionBody, ChatCompletionResponse, stop_reason};

/// Unified provider for any chat-completions API.
///
/// Does NOT derive Debug: the bearer key lives in this struct and is only
/// exposed when building request headers.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
    provider_name: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            provider_name: config.kind.to_string(),
            config,
        })
    }

    fn body(&self, request: &CompletionRequest, stream: bool) -> ChatCompletionBody {
        ChatCompletionBody::from_request(
            request,
            &self.config.model,
            self.config.kind.accepts_extensions(),
            stream,
        )
    }

    fn post(&self, body: &ChatCompletionBody) -> reqwest::RequestBuilder {
        self.client
            .post(self.config.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(body)
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.body(request, false);
        debug!(provider = %self.provider_name, model = %body.model, "sending completion request");

        let response = self
            .post(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status.as_u16(), error_body));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Deserialization("response has no choices".to_string()))?;

        Ok(CompletionResponse {
            id: parsed.id,
            content: choice.message.content.unwrap_or_default(),
            model: if parsed.model.is_empty() {
                body.model
            } else {
                parsed.model
            },
            stop_reason: stop_reason(choice.finish_reason.as_deref()),
            usage: parsed.usage.map(Into::into).unwrap_or_default(),
        })
    }

    fn stream(&self, request: CompletionRequest) -> LlmStream {
        let body = self.body(&request, true);
        debug!(provider = %self.provider_name, model = %body.model, "opening completion stream");
        create_stream(self.provider_name.clone(), self.post(&body))
    }
}

/// Map a non-success HTTP status to an [`LlmError`].
pub(crate) fn map_status_error(status: u16, body: String) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        400 | 422 => LlmError::InvalidRequest(body),
        500..=599 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}
