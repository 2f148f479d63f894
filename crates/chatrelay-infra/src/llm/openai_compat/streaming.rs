//! Chat-completions SSE stream to [`StreamEvent`] adapter.
//!
//! The returned stream emits:
//! 1. `Connected` once the response headers arrive
//! 2. `TextDelta` for each non-empty content fragment
//! 3. `MessageDelta` when a `finish_reason` appears
//! 4. `Usage` if the backend reports it
//! 5. `Done` on `[DONE]` or a clean end of stream
//!
//! Malformed chunks are logged and skipped. Any other failure yields one
//! `Err` and ends the stream.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use tracing::{debug, warn};

use chatrelay_core::llm::provider::LlmStream;
use chatrelay_types::llm::{LlmError, StreamEvent};

use super::map_status_error;
use super::types::{ChatChunk, stop_reason};

/// Events carried by one parsed chunk.
pub fn chunk_events(chunk: ChatChunk) -> Result<Vec<StreamEvent>, LlmError> {
    if let Some(error) = chunk.error {
        return Err(LlmError::Provider {
            message: error.message,
        });
    }

    let mut events = Vec::new();
    for choice in chunk.choices {
        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
            events.push(StreamEvent::TextDelta { text });
        }
        if let Some(reason) = choice.finish_reason.as_deref() {
            events.push(StreamEvent::MessageDelta {
                stop_reason: stop_reason(Some(reason)),
            });
        }
    }
    if let Some(usage) = chunk.usage {
        events.push(StreamEvent::Usage(usage.into()));
    }
    Ok(events)
}

/// Open an SSE connection for `request` and adapt it to [`StreamEvent`]s.
pub fn create_stream(provider: String, request: reqwest::RequestBuilder) -> LlmStream {
    Box::pin(async_stream::stream! {
        let mut source = match EventSource::new(request) {
            Ok(source) => source,
            Err(e) => {
                yield Err(LlmError::InvalidRequest(format!("request cannot be streamed: {e}")));
                return;
            }
        };

        let mut completed = false;
        let mut chunks = 0u32;
        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => yield Ok(StreamEvent::Connected),
                Ok(Event::Message(message)) => {
                    if message.data.trim() == "[DONE]" {
                        completed = true;
                        break;
                    }
                    chunks += 1;
                    let chunk: ChatChunk = match serde_json::from_str(&message.data) {
                        Ok(chunk) => chunk,
                        Err(e) => {
                            warn!(provider = %provider, error = %e, chunk = chunks, "skipping malformed chunk");
                            continue;
                        }
                    };
                    match chunk_events(chunk) {
                        Ok(events) => {
                            for event in events {
                                yield Ok(event);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            break;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    completed = true;
                    break;
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let body = response.text().await.unwrap_or_default();
                    yield Err(map_status_error(status.as_u16(), body));
                    break;
                }
                Err(e) => {
                    yield Err(LlmError::Stream(e.to_string()));
                    break;
                }
            }
        }
        source.close();

        if completed {
            debug!(provider = %provider, chunks, "stream complete");
            yield Ok(StreamEvent::Done);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{serve_fixed, sse_body};
    use chatrelay_types::llm::{StopReason, Usage};

    fn parse(raw: &str) -> ChatChunk {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_text_and_finish() {
        let events = chunk_events(parse(
            r#"{"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#,
        ))
        .unwrap();
        assert_eq!(events, vec![StreamEvent::TextDelta { text: "Hel".into() }]);

        let events = chunk_events(parse(
            r#"{"choices":[{"delta":{},"finish_reason":"length"}]}"#,
        ))
        .unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::MessageDelta {
                stop_reason: StopReason::MaxTokens
            }]
        );
    }

    #[test]
    fn test_empty_content_skipped() {
        let events =
            chunk_events(parse(r#"{"choices":[{"delta":{"content":""}}]}"#)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_usage_chunk() {
        let events = chunk_events(parse(
            r#"{"choices":[],"usage":{"prompt_tokens":5,"completion_tokens":7}}"#,
        ))
        .unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::Usage(Usage {
                input_tokens: 5,
                output_tokens: 7
            })]
        );
    }

    #[test]
    fn test_error_chunk() {
        let err = chunk_events(parse(r#"{"error":{"message":"context too long"}}"#)).unwrap_err();
        assert!(err.to_string().contains("context too long"));
    }

    async fn collect_from(status: &'static str, content_type: &'static str, body: String) -> Vec<Result<StreamEvent, LlmError>> {
        let base = serve_fixed(status, content_type, body).await;
        let request = reqwest::Client::new()
            .post(format!("{base}/chat/completions"))
            .json(&serde_json::json!({ "stream": true }));
        create_stream("test".to_string(), request).collect().await
    }

    fn delta(text: &str) -> String {
        serde_json::json!({ "choices": [{ "delta": { "content": text } }] }).to_string()
    }

    #[tokio::test]
    async fn test_rejected_key_fails_before_connected() {
        let items = collect_from("401 Unauthorized", "application/json", r#"{"error":"bad key"}"#.to_string()).await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(LlmError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_server_error_carries_body() {
        let items = collect_from("500 Internal Server Error", "text/plain", "upstream down".to_string()).await;
        assert_eq!(items.len(), 1);
        match &items[0] {
            Err(LlmError::Overloaded(body)) => assert_eq!(body, "upstream down"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clean_stream_ends_with_done() {
        let finish = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let body = sse_body(&[&delta("Hel"), &delta("lo"), finish, "[DONE]"]);
        let events: Vec<StreamEvent> = collect_from("200 OK", "text/event-stream", body)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            events,
            vec![
                StreamEvent::Connected,
                StreamEvent::TextDelta { text: "Hel".into() },
                StreamEvent::TextDelta { text: "lo".into() },
                StreamEvent::MessageDelta {
                    stop_reason: StopReason::EndTurn
                },
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_chunk_is_skipped() {
        let body = sse_body(&[&delta("a"), "{not json", &delta("b"), "[DONE]"]);
        let events: Vec<StreamEvent> = collect_from("200 OK", "text/event-stream", body)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            events,
            vec![
                StreamEvent::Connected,
                StreamEvent::TextDelta { text: "a".into() },
                StreamEvent::TextDelta { text: "b".into() },
                StreamEvent::Done,
            ]
        );
    }
}
