use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating an article.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid prompt: {0}")]
    Prompt(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Provider error{}: {message}", http_status(.status))]
    Provider { status: Option<u16>, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn http_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Broad failure category, used for exit statuses and by callers that only
/// care which stage of the run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid configuration, including an empty prompt.
    Configuration,
    /// The completion API could not be reached or returned an error.
    Api,
    /// The article could not be written.
    Io,
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn prompt(message: impl Into<String>) -> Self {
        Error::Prompt(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth(message.into())
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Error::RateLimit(message.into())
    }

    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Provider {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::Prompt(_) => ErrorKind::Configuration,
            Error::Http(_)
            | Error::Auth(_)
            | Error::RateLimit(_)
            | Error::Provider { .. }
            | Error::MalformedResponse(_) => ErrorKind::Api,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// Process exit status for this error (sysexits.h values).
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Configuration => 78,
            ErrorKind::Api => 69,
            ErrorKind::Io => 74,
        }
    }
}
