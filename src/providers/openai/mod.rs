mod client;
mod types;

pub use client::{OpenAIProvider, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
