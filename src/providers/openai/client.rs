use super::types::{ChatCompletionRequest, OpenAIError, StreamOptions, StreamPayload};
use crate::provider::CompletionProvider;
use crate::sse_stream::{SseEvent, SseStreamExt};
use crate::types::FinishReason;
use crate::{Error, GenerationRequest, Response, StreamEvent};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI Chat Completions provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::with_options(api_key, DEFAULT_BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    /// Create a provider with a custom base URL and request timeout.
    pub fn with_options(api_key: String, base_url: String, timeout: Duration) -> Result<Self, Error> {
        if api_key.trim().is_empty() {
            return Err(Error::config("OpenAI API key must not be empty"));
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn convert_request(request: &GenerationRequest) -> ChatCompletionRequest<'_> {
        let sampling = &request.sampling;
        ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            top_p: sampling.top_p,
            frequency_penalty: sampling.frequency_penalty,
            presence_penalty: sampling.presence_penalty,
            stream: true,
            stream_options: Some(StreamOptions { include_usage: true }),
        }
    }

    /// Map one SSE event to the stream events it carries.
    fn convert_event(event: SseEvent) -> Result<Vec<StreamEvent>, Error> {
        if event.is_done() {
            return Ok(vec![StreamEvent::Done]);
        }

        let payload: StreamPayload = serde_json::from_str(&event.data)
            .map_err(|e| Error::malformed(format!("unexpected completion chunk: {e}")))?;

        let chunk = match payload {
            StreamPayload::Error(OpenAIError { error }) => {
                return Ok(vec![StreamEvent::Error {
                    message: error.message,
                }]);
            }
            StreamPayload::Chunk(chunk) => chunk,
        };

        let mut events = Vec::new();
        // Only one choice is ever requested.
        if let Some(choice) = chunk.choices.into_iter().find(|c| c.index == 0) {
            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                events.push(StreamEvent::ContentDelta { delta: content });
            }
            if let Some(reason) = choice.finish_reason {
                events.push(StreamEvent::Finished {
                    finish_reason: FinishReason::from(reason.as_str()),
                });
            }
        }
        if let Some(usage) = chunk.usage {
            events.push(StreamEvent::Usage { usage });
        }
        Ok(events)
    }

    /// Turn a non-success HTTP response into the matching error.
    async fn error_from_response(response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<OpenAIError>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("no response body").to_string()
                } else {
                    body
                }
            });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::auth(message),
            StatusCode::TOO_MANY_REQUESTS => Error::rate_limit(message),
            _ => Error::provider(Some(status.as_u16()), message),
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Response, Error> {
        let body = Self::convert_request(request);
        tracing::debug!(
            model = %request.model,
            endpoint = %self.endpoint(),
            max_tokens = body.max_tokens,
            "sending completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error = Self::error_from_response(response).await;
            tracing::warn!(%error, "completion request rejected");
            return Err(error);
        }

        let events = response
            .bytes_stream()
            .sse_events()
            .map(|sse| match sse.and_then(Self::convert_event) {
                Ok(events) => events.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            })
            .flat_map(futures_util::stream::iter);

        Ok(Response::from_stream(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Prompt, SamplingParams};

    fn sse(data: &str) -> SseEvent {
        SseEvent {
            data: data.to_string(),
        }
    }

    #[test]
    fn test_provider_creation() {
        assert!(OpenAIProvider::new("test-key".to_string()).is_ok());
        assert!(matches!(
            OpenAIProvider::new("  ".to_string()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = OpenAIProvider::new("sk-secret".to_string()).unwrap();
        let printed = format!("{provider:?}");
        assert!(!printed.contains("sk-secret"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OpenAIProvider::with_options(
            "k".to_string(),
            "http://localhost:9/v1/".to_string(),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn test_request_conversion() {
        let request = GenerationRequest::new("gpt-4o-mini", Prompt::user("Hello"))
            .unwrap()
            .with_sampling(SamplingParams {
                temperature: 0.3,
                max_tokens: 50,
                ..Default::default()
            });

        let body = serde_json::to_value(OpenAIProvider::convert_request(&request)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
        assert_eq!(body["max_tokens"], 50);
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"]["include_usage"], true);
    }

    #[test]
    fn test_convert_content_chunk() {
        let events = OpenAIProvider::convert_event(sse(
            r#"{"id":"c1","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"content":"Hi"},"finish_reason":null}]}"#,
        ))
        .unwrap();
        assert_eq!(events, vec![StreamEvent::delta("Hi")]);
    }

    #[test]
    fn test_convert_finish_and_usage() {
        let events = OpenAIProvider::convert_event(sse(
            r#"{"choices":[{"index":0,"delta":{},"finish_reason":"length"}]}"#,
        ))
        .unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::Finished {
                finish_reason: FinishReason::Length
            }]
        );

        let events = OpenAIProvider::convert_event(sse(
            r#"{"choices":[],"usage":{"prompt_tokens":9,"completion_tokens":12,"total_tokens":21}}"#,
        ))
        .unwrap();
        match &events[0] {
            StreamEvent::Usage { usage } => assert_eq!(usage.total_tokens, 21),
            other => panic!("expected usage, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_done_and_error() {
        assert_eq!(
            OpenAIProvider::convert_event(sse("[DONE]")).unwrap(),
            vec![StreamEvent::Done]
        );

        let events = OpenAIProvider::convert_event(sse(
            r#"{"error":{"message":"model overloaded","type":"server_error","code":null}}"#,
        ))
        .unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::Error {
                message: "model overloaded".to_string()
            }]
        );
    }

    #[test]
    fn test_convert_garbage_is_malformed() {
        let err = OpenAIProvider::convert_event(sse("not json")).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
