mod executor;

pub use executor::{backoff_delay, CallExecutor};

use crate::config::LlmConfig;
use crate::error::{CallError, LlmError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// One stateless round trip to the LLM service: a system instruction plus a
/// user prompt in, text out. No conversation state is carried between calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(config.timeout_sec);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout,
        })
    }

    fn classify_status(status: u16, body: String) -> LlmError {
        match status {
            429 => LlmError::RateLimited(body),
            401 | 403 => LlmError::Auth(body),
            404 => LlmError::NotFound(body),
            _ => LlmError::Http { status, body },
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ]
        });

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(Self::classify_status(status.as_u16(), body_text));
        }

        let val: Value = resp
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        val.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Startup connection check: one ping round trip through the executor.
/// Unlike mid-run calls, any failure here is fatal: if the credential or
/// model is wrong, no subsequent call can succeed.
pub async fn validate_connection(executor: &CallExecutor) -> Result<(), CallError> {
    use crate::catalog::Operation;

    let reply = executor
        .call(Operation::ConnectionCheck, "Be concise and precise.", "ping")
        .await?;
    info!("Connection check succeeded ({} byte reply)", reply.len());
    Ok(())
}
