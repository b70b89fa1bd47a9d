//! Fixed-delay retry loop with a per-attempt timeout.
//!
//! Attempts run strictly one after another. Each attempt gets its own
//! deadline; when it elapses the attempt future is dropped, which aborts any
//! in-flight request. A failed attempt is followed by a fixed wait only if
//! another attempt will be made.

use std::future::Future;
use std::time::Duration;

use mailhook_common::config::WebhookConfig;
use mailhook_common::types::DeliveryStatus;

use crate::error::{DeliveryError, Result};

/// How many times to try, how long each try may take, and how long to wait
/// between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub timeout: Duration,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&WebhookConfig::default())
    }
}

impl From<&WebhookConfig> for RetryPolicy {
    fn from(config: &WebhookConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            timeout: config.timeout,
            delay: config.retry_delay,
        }
    }
}

/// Final result of a retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome<T = u16> {
    /// An attempt succeeded; no further attempts were made.
    Delivered { response: T, attempts: u32 },
    /// Every permitted attempt failed. `error` is the last attempt's error.
    Failed { error: DeliveryError, attempts: u32 },
}

impl<T> DeliveryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn status(&self) -> DeliveryStatus {
        match self {
            Self::Delivered { .. } => DeliveryStatus::Sent,
            Self::Failed { .. } => DeliveryStatus::Failed,
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Delivered { response, .. } => Ok(response),
            Self::Failed { error, .. } => Err(error),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, timeout: Duration, delay: Duration) -> Self {
        Self {
            max_attempts,
            timeout,
            delay,
        }
    }

    fn timeout_ms(&self) -> u64 {
        millis(self.timeout)
    }

    /// Run `attempt` until it succeeds or the attempt budget is spent.
    ///
    /// `attempt` receives the 1-based attempt number. Earlier errors are
    /// discarded; only the last one is reported.
    pub async fn run<F, Fut, T>(&self, mut attempt: F) -> DeliveryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt_number = 1;

        loop {
            let error = match tokio::time::timeout(self.timeout, attempt(attempt_number)).await {
                Ok(Ok(response)) => {
                    return DeliveryOutcome::Delivered {
                        response,
                        attempts: attempt_number,
                    };
                }
                Ok(Err(error)) => error,
                Err(_) => DeliveryError::timeout(self.timeout_ms()),
            };

            if attempt_number >= max_attempts || !error.is_retryable() {
                tracing::debug!(
                    attempt = attempt_number,
                    max_attempts,
                    error = %error,
                    "Giving up on webhook delivery"
                );
                return DeliveryOutcome::Failed {
                    error,
                    attempts: attempt_number,
                };
            }

            tracing::debug!(
                attempt = attempt_number,
                max_attempts,
                delay_ms = millis(self.delay),
                error = %error,
                "Webhook attempt failed, retrying"
            );

            tokio::time::sleep(self.delay).await;
            attempt_number += 1;
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
