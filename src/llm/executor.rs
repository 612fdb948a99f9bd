use crate::catalog::Operation;
use crate::config::RetryConfig;
use crate::error::{CallError, LlmError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::LlmClient;

/// Exponential backoff delay for a zero-based attempt index, capped at the
/// configured maximum: `min(base * 2^attempt, max)`.
pub fn backoff_delay(retry: &RetryConfig, attempt: u32) -> Duration {
    let ms = retry
        .backoff_base_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(ms.min(retry.backoff_max_ms))
}

/// Issues a single request to the LLM service, retrying transient failures
/// with exponential backoff. First success wins; auth and not-found errors
/// short-circuit without further attempts.
#[derive(Clone)]
pub struct CallExecutor {
    client: Arc<dyn LlmClient>,
    retry: RetryConfig,
}

impl CallExecutor {
    pub fn new(client: Arc<dyn LlmClient>, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    pub async fn call(
        &self,
        op: Operation,
        system: &str,
        prompt: &str,
    ) -> Result<String, CallError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            match self.client.complete(system, prompt).await {
                Ok(text) => {
                    debug!("{} succeeded on attempt {}", op, attempt + 1);
                    return Ok(text);
                }
                Err(e) if !e.is_retryable() => {
                    warn!("{} attempt {} hit non-retryable error: {}", op, attempt + 1, e);
                    return Err(CallError::Fatal(e));
                }
                Err(e) => {
                    warn!(
                        "{} attempt {}/{} failed: {}",
                        op,
                        attempt + 1,
                        max_attempts,
                        e
                    );
                    if attempt + 1 >= max_attempts {
                        warn!("{}: all {} attempts failed", op, max_attempts);
                        return Err(CallError::Exhausted {
                            attempts: max_attempts,
                            last: e,
                        });
                    }
                    let delay = backoff_delay(&self.retry, attempt);
                    if matches!(e, LlmError::RateLimited(_)) {
                        debug!("{}: rate limited, waiting {:?} before retry", op, delay);
                    } else {
                        debug!("{}: retrying in {:?}", op, delay);
                    }
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
