use crate::{Error, GenerationRequest, Response};

/// A hosted completion service.
/// Responses are always streamed; `response.buffer().await` collects the
/// finished result.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue one completion request. No retries are attempted.
    async fn generate(&self, request: &GenerationRequest) -> Result<Response, Error>;
}
