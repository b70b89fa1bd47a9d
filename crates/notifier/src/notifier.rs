//! Delivery of received-email notifications to a webhook endpoint.

use bytes::Bytes;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use mailhook_common::config::WebhookConfig;
use mailhook_common::types::NotificationEvent;

use crate::client::WebhookClient;
use crate::error::{DeliveryError, Result};
use crate::payload::WebhookBody;
use crate::retry::{DeliveryOutcome, RetryPolicy};

/// Details of a successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// 2xx status returned by the endpoint
    pub status_code: u16,
    /// Attempts made, including the successful one
    pub attempts: u32,
}

/// Posts [`NotificationEvent`]s to webhook URLs with bounded retries.
///
/// Holds no per-delivery state; a single instance can serve concurrent
/// deliveries.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: WebhookClient,
    policy: RetryPolicy,
}

impl Notifier {
    pub fn new(client: WebhookClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Build a notifier with a fresh HTTP client and the given settings.
    pub fn from_config(config: &WebhookConfig) -> Result<Self> {
        Ok(Self::new(WebhookClient::new()?, RetryPolicy::from(config)))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Deliver `event` to `url`, failing with the last attempt's error if
    /// every attempt fails.
    pub async fn deliver(&self, url: &str, event: &NotificationEvent) -> Result<DeliveryReceipt> {
        match self.dispatch(url, event).await {
            DeliveryOutcome::Delivered { response, attempts } => Ok(DeliveryReceipt {
                status_code: response,
                attempts,
            }),
            DeliveryOutcome::Failed { error, .. } => Err(error),
        }
    }

    /// Like [`Notifier::deliver`], but returns the full outcome including the
    /// number of attempts made on failure.
    pub async fn dispatch(&self, url: &str, event: &NotificationEvent) -> DeliveryOutcome {
        let span = info_span!(
            "webhook_delivery",
            delivery_id = %Uuid::new_v4(),
            event = %event.event,
            email_id = %event.data.email_id,
            url = %url
        );

        async move {
            let body = WebhookBody::for_target(url, event);
            let bytes = match serde_json::to_vec(&body) {
                Ok(bytes) => Bytes::from(bytes),
                Err(e) => {
                    let error = DeliveryError::from(e);
                    tracing::error!(error = %error, "Could not encode webhook body");
                    return DeliveryOutcome::Failed { error, attempts: 0 };
                }
            };

            tracing::debug!(markdown = body.is_markdown(), "Delivering webhook");

            let outcome = self
                .policy
                .run(|attempt| {
                    let bytes = bytes.clone();
                    async move {
                        tracing::debug!(attempt, "Sending webhook");
                        self.client.post(url, event.event, bytes).await
                    }
                })
                .await;

            match &outcome {
                DeliveryOutcome::Delivered { response, attempts } => {
                    tracing::info!(status = *response, attempts = *attempts, "Webhook delivered");
                }
                DeliveryOutcome::Failed { error, attempts } => {
                    tracing::warn!(error = %error, attempts = *attempts, "Webhook delivery failed");
                }
            }

            outcome
        }
        .instrument(span)
        .await
    }
}
