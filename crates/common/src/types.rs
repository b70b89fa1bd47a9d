use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Kinds of webhook events the notifier can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEvent {
    #[serde(rename = "email.received")]
    EmailReceived,
}

impl WebhookEvent {
    /// Every valid event kind, in declaration order.
    pub const ALL: &'static [WebhookEvent] = &[WebhookEvent::EmailReceived];

    /// Wire string sent in the `X-Webhook-Event` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::EmailReceived => "email.received",
        }
    }
}

impl std::fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookEvent {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WebhookEvent::ALL
            .iter()
            .copied()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("unknown webhook event: {s}")))
    }
}

/// Notification delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "pending"),
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A received email, as handed over by the inbox that accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub email_id: String,
    pub message_id: String,
    pub from_address: String,
    pub to_address: String,
    pub subject: String,
    /// Plain-text body
    pub content: String,
    /// Rendered HTML body
    pub html: String,
    /// Receipt time exactly as the producer formatted it. Forwarded verbatim,
    /// never reparsed.
    pub received_at: String,
}

/// An event paired with the email it describes; the unit submitted for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub event: WebhookEvent,
    pub data: EmailMessage,
}

impl NotificationEvent {
    pub fn new(event: WebhookEvent, data: EmailMessage) -> Self {
        Self { event, data }
    }

    pub fn email_received(data: EmailMessage) -> Self {
        Self::new(WebhookEvent::EmailReceived, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_email() -> EmailMessage {
        EmailMessage {
            email_id: "em_01".to_string(),
            message_id: "<abc@mail.example.com>".to_string(),
            from_address: "alice@example.com".to_string(),
            to_address: "inbox@mailhook.dev".to_string(),
            subject: "Quarterly report".to_string(),
            content: "See attached.".to_string(),
            html: "<p>See attached.</p>".to_string(),
            received_at: "2024-05-01T08:30:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_event_parses_known_kind() {
        let event: WebhookEvent = "email.received".parse().unwrap();
        assert_eq!(event, WebhookEvent::EmailReceived);
        assert_eq!(event.to_string(), "email.received");
    }

    #[test]
    fn test_event_rejects_unknown_kind() {
        let err = "email.deleted".parse::<WebhookEvent>().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_email_message_uses_camel_case() {
        let value = serde_json::to_value(sample_email()).unwrap();
        assert_eq!(value["fromAddress"], "alice@example.com");
        assert_eq!(value["toAddress"], "inbox@mailhook.dev");
        assert_eq!(value["receivedAt"], "2024-05-01T08:30:00.000Z");
        assert!(value.get("from_address").is_none());
    }

    #[test]
    fn test_notification_event_round_trips_from_upstream_json() {
        let json = r#"{
            "event": "email.received",
            "data": {
                "emailId": "em_01",
                "messageId": "<abc@mail.example.com>",
                "fromAddress": "alice@example.com",
                "toAddress": "inbox@mailhook.dev",
                "subject": "Quarterly report",
                "content": "See attached.",
                "html": "<p>See attached.</p>",
                "receivedAt": "2024-05-01T08:30:00.000Z"
            }
        }"#;

        let event: NotificationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, NotificationEvent::email_received(sample_email()));
    }

    #[test]
    fn test_received_at_is_kept_verbatim() {
        for raw in [
            "2024-05-01T08:30:00.000Z",
            "2024-05-01T16:30:00+08:00",
            "2024-05-01 08:30:00",
        ] {
            let json = serde_json::json!({
                "emailId": "em_01",
                "messageId": "<abc@mail.example.com>",
                "fromAddress": "alice@example.com",
                "toAddress": "inbox@mailhook.dev",
                "subject": "Quarterly report",
                "content": "See attached.",
                "html": "<p>See attached.</p>",
                "receivedAt": raw
            });

            let email: EmailMessage = serde_json::from_value(json).unwrap();
            assert_eq!(email.received_at, raw);
            assert_eq!(serde_json::to_value(&email).unwrap()["receivedAt"], raw);
        }
    }

    #[test]
    fn test_delivery_status_display() {
        assert_eq!(DeliveryStatus::Pending.to_string(), "pending");
        assert_eq!(DeliveryStatus::Sent.to_string(), "sent");
        assert_eq!(DeliveryStatus::Failed.to_string(), "failed");
    }
}
