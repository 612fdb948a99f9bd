use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("API key environment variable '{0}' is not set")]
    MissingApiKey(String),
}

/// One failed round trip to the LLM service.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("model or endpoint not found: {0}")]
    NotFound(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response contained no message content")]
    EmptyResponse,
}

impl LlmError {
    /// Auth and not-found cannot be fixed by waiting; everything else is
    /// treated as transient and retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LlmError::Auth(_) | LlmError::NotFound(_))
    }
}

/// Terminal outcome of a retried call.
#[derive(Error, Debug)]
pub enum CallError {
    #[error("non-retryable failure: {0}")]
    Fatal(LlmError),

    #[error("all {attempts} attempts failed, last error: {last}")]
    Exhausted { attempts: u32, last: LlmError },
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read input file '{path}': {source}")]
    ReadFile { path: PathBuf, source: csv::Error },

    #[error("Failed to parse row {row}: {source}")]
    ParseRow { row: usize, source: csv::Error },

    #[error("Row {row} has an empty '{field}' field")]
    EmptyField { row: usize, field: &'static str },
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write result table: {0}")]
    Write(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
