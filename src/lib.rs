//! Generate blog articles with a hosted completion API.
//!
//! The pipeline is deliberately linear: load the API key, send one completion
//! request per paragraph, write the article. Every failure is terminal.

pub mod accumulator;
pub mod article;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod output;
pub mod provider;
pub mod providers;
pub mod response;
pub mod sse_stream;
pub mod types;

// Re-export core types for easy usage
pub use article::{Article, ArticlePlan};
pub use config::{Overrides, Settings};
pub use error::{Error, ErrorKind};
pub use generator::{BlogGenerator, RunReport};
pub use provider::CompletionProvider;
pub use providers::OpenAIProvider;
pub use response::{GenerationResult, Response};
pub use types::*;
