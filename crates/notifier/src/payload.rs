//! Outbound webhook bodies.
//!
//! DingTalk robot endpoints only accept their own message envelope, so the
//! target URL decides between a markdown message and a plain summary of the
//! email. Both shapes carry the same four fields.

use serde::Serialize;

use mailhook_common::types::{EmailMessage, NotificationEvent};

/// Host and path of DingTalk custom-robot webhooks, compared case-insensitively.
const DINGTALK_ROBOT_PATTERN: &str = "oapi.dingtalk.com/robot/send";

/// Returns `true` if `url` points at a DingTalk robot webhook.
pub fn is_dingtalk_robot(url: &str) -> bool {
    url.to_ascii_lowercase().contains(DINGTALK_ROBOT_PATTERN)
}

/// JSON body of a webhook request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WebhookBody {
    Markdown(MarkdownMessage),
    Summary(EmailSummary),
}

/// DingTalk `markdown` message envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownMessage {
    pub msgtype: &'static str,
    pub markdown: MarkdownContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownContent {
    pub title: String,
    pub text: String,
}

/// Generic body for any other endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub from_address: String,
    pub to_address: String,
    pub subject: String,
    pub received_at: String,
}

impl WebhookBody {
    /// Pick the body shape for `url` and fill it from `event`.
    pub fn for_target(url: &str, event: &NotificationEvent) -> Self {
        if is_dingtalk_robot(url) {
            Self::Markdown(MarkdownMessage::from_email(&event.data))
        } else {
            Self::Summary(EmailSummary::from_email(&event.data))
        }
    }

    pub fn is_markdown(&self) -> bool {
        matches!(self, Self::Markdown(_))
    }
}

impl MarkdownMessage {
    pub fn from_email(email: &EmailMessage) -> Self {
        let text = [
            "#### **收到一封新邮件**".to_string(),
            format!("**发件人:** {}", email.from_address),
            format!("**收件人:** {}", email.to_address),
            format!("**主题:** {}", email.subject),
            format!("**时间:** {}", email.received_at),
        ]
        .join("\n\n");

        Self {
            msgtype: "markdown",
            markdown: MarkdownContent {
                title: format!("新邮件: {}", email.subject),
                text,
            },
        }
    }
}

impl EmailSummary {
    pub fn from_email(email: &EmailMessage) -> Self {
        Self {
            from_address: email.from_address.clone(),
            to_address: email.to_address.clone(),
            subject: email.subject.clone(),
            received_at: email.received_at.clone(),
        }
    }
}
