//! Configuration: the `.env` file, environment variables and command-line overrides.

use crate::providers::openai::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::types::SamplingParams;
use crate::Error;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Load `KEY=VALUE` pairs into the process environment. Variables that are
/// already set keep their values.
///
/// With no explicit path the nearest `.env` (current directory, then its
/// ancestors) is used, and its absence is fine. An explicit path must exist.
/// Returns the file that was loaded, if any.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, Error> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| {
                Error::config(format!("cannot load env file {}: {e}", path.display()))
            })?;
            tracing::debug!(path = %path.display(), "loaded env file");
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenvy::dotenv() {
            Ok(found) => {
                tracing::debug!(path = %found.display(), "loaded env file");
                Ok(Some(found))
            }
            Err(e) if e.not_found() => {
                tracing::debug!("no .env file found");
                Ok(None)
            }
            Err(e) => Err(Error::config(format!("cannot load .env file: {e}"))),
        },
    }
}

/// Values given on the command line. Each one, when present, wins over the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub timeout: Option<Duration>,
}

/// Everything needed to talk to the completion API.
#[derive(Clone)]
pub struct Settings {
    api_key: String,
    pub model: String,
    pub base_url: String,
    pub sampling: SamplingParams,
    pub timeout: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("sampling", &self.sampling)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    /// Create settings with an explicit API key and defaults for the rest.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(missing_key());
        }

        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            sampling: SamplingParams::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).ok_or_else(missing_key)?;
        let mut settings = Self::new(api_key)?;

        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.trim().is_empty()) {
            settings.model = model.trim().to_string();
        }
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|u| !u.trim().is_empty()) {
            settings.base_url = base_url.trim().to_string();
        }

        Ok(settings)
    }

    /// Apply command-line overrides and validate the result.
    pub fn apply(mut self, overrides: Overrides) -> Result<Self, Error> {
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = timeout;
        }

        let sampling = &mut self.sampling;
        if let Some(temperature) = overrides.temperature {
            sampling.temperature = temperature;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            sampling.max_tokens = max_tokens;
        }
        if let Some(top_p) = overrides.top_p {
            sampling.top_p = top_p;
        }
        if let Some(penalty) = overrides.frequency_penalty {
            sampling.frequency_penalty = penalty;
        }
        if let Some(penalty) = overrides.presence_penalty {
            sampling.presence_penalty = penalty;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.model.trim().is_empty() {
            return Err(Error::config("model name must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::config(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than 0"));
        }
        self.sampling.validate()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

fn missing_key() -> Error {
    Error::config(format!(
        "{API_KEY_VAR} is not set. Create a .env file containing {API_KEY_VAR}=<your key>"
    ))
}
