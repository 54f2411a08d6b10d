use super::config::SamplingParams;
use super::message::Message;
use super::prompt::Prompt;
use crate::Error;

/// A single completion request. Built right before the API call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub sampling: SamplingParams,
}

impl GenerationRequest {
    /// Build a request with default sampling. Fails on an empty prompt.
    pub fn new(model: impl Into<String>, prompt: impl Into<Prompt>) -> Result<Self, Error> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return Err(Error::prompt("prompt must not be empty"));
        }
        let model = model.into();
        if model.trim().is_empty() {
            return Err(Error::config("model name must not be empty"));
        }

        Ok(Self {
            model,
            messages: prompt.into_messages(),
            sampling: SamplingParams::default(),
        })
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }
}
