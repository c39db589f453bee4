use std::future::Future;
use std::time::Duration;

use crate::{
    config::Config,
    constants::{HTTP_MAX_RETRIES, HTTP_RETRY_BASE_DELAY_MS},
    error::{AppError, Result},
};

/// Bounded retry with linearly growing delay: after failed attempt `n` the
/// next attempt waits `n * base_delay`. No jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: HTTP_MAX_RETRIES,
            base_delay: Duration::from_millis(HTTP_RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.http_max_retries.max(1),
            base_delay: Duration::from_millis(config.http_retry_base_delay_ms),
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

pub async fn retry_with_backoff<T, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_error: Option<AppError> = None;

    for attempt in 1..=attempts {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(err) => {
                tracing::warn!("{} attempt {}/{} failed: {}", label, attempt, attempts, err);
                last_error = Some(err);
                if attempt < attempts {
                    tokio::time::sleep(policy.delay_after(attempt)).await;
                }
            }
        }
    }

    let reason = last_error
        .map(|err| err.to_string())
        .unwrap_or_else(|| "no attempt made".to_string());
    Err(AppError::ExternalAPI(format!(
        "Max retries exceeded for {}: {}",
        label, reason
    )))
}

/// GET `url`, treating transport failures and non-2xx statuses alike.
pub async fn fetch_with_retry(
    client: &reqwest::Client,
    url: &str,
    policy: RetryPolicy,
) -> Result<reqwest::Response> {
    let label = redact_query(url);
    retry_with_backoff(policy, label, |_| async move {
        let response = client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AppError::ExternalAPI(format!("{} responded {}", label, status)))
        }
    })
    .await
}

// Query strings carry API keys; keep them out of the logs.
fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
