//! HTTP transport for a single webhook attempt.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderValue};

use mailhook_common::types::WebhookEvent;

use crate::error::{DeliveryError, Result};

/// Header carrying the event kind on every request.
pub const EVENT_HEADER: &str = "X-Webhook-Event";

const USER_AGENT: &str = concat!("mailhook/", env!("CARGO_PKG_VERSION"));

/// Response bodies of failed attempts are truncated to this many bytes in logs.
const MAX_LOGGED_BODY: usize = 1024;

/// Thin wrapper over a pooled `reqwest::Client`.
///
/// Cloning is cheap and shares the connection pool. Clients built by
/// [`WebhookClient::new`] set no client-level timeout; the retry loop bounds
/// each attempt.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    /// Timeout configured on `client`, reported when reqwest itself times out
    timeout: Option<Duration>,
}

impl WebhookClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DeliveryError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: None,
        })
    }

    /// Use an existing client, e.g. one shared with the rest of the process.
    ///
    /// `timeout` is the request timeout `client` was built with, if any.
    pub fn with_client(client: reqwest::Client, timeout: Option<Duration>) -> Self {
        Self { client, timeout }
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout
            .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }

    /// POST `body` to `url` once.
    ///
    /// Returns the status code on 2xx; any other status becomes
    /// [`DeliveryError::Status`]. A timeout raised by the client becomes
    /// [`DeliveryError::Timeout`], other send failures
    /// [`DeliveryError::Network`].
    pub async fn post(&self, url: &str, event: WebhookEvent, body: Bytes) -> Result<u16> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(EVENT_HEADER, event.as_str())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Webhook request failed");
                if e.is_timeout() {
                    DeliveryError::timeout(self.timeout_ms())
                } else {
                    DeliveryError::from(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "Webhook accepted");
            return Ok(status.as_u16());
        }

        match response.bytes().await {
            Ok(bytes) => {
                let end = bytes.len().min(MAX_LOGGED_BODY);
                tracing::debug!(
                    status = status.as_u16(),
                    body = %String::from_utf8_lossy(&bytes[..end]),
                    "Webhook rejected"
                );
            }
            Err(e) => {
                tracing::debug!(status = status.as_u16(), error = %e, "Webhook rejected, body unreadable");
            }
        }

        Err(DeliveryError::status(status.as_u16()))
    }
}
