//! Deliver one received email to the configured webhook.
//!
//! Reads an `EmailMessage` JSON document from stdin. The event kind may be
//! given as the first argument and defaults to `email.received`.
//!
//! ```bash
//! WEBHOOK_URL="https://oapi.dingtalk.com/robot/send?access_token=..." \
//!   mailhook-notify < message.json
//! ```

use std::io::Read;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use mailhook_common::config::AppConfig;
use mailhook_common::types::{EmailMessage, NotificationEvent, WebhookEvent};
use mailhook_notifier::Notifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailhook_notifier=info,mailhook_common=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    let url = config.require_webhook_url()?;

    let event = match std::env::args().nth(1) {
        Some(kind) => kind.parse::<WebhookEvent>()?,
        None => WebhookEvent::EmailReceived,
    };

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read email from stdin")?;
    let email: EmailMessage =
        serde_json::from_str(&input).context("stdin is not a valid email message")?;

    let notifier = Notifier::from_config(&config.webhook)?;
    let receipt = notifier
        .deliver(url, &NotificationEvent::new(event, email))
        .await
        .context("webhook delivery failed")?;

    tracing::info!(
        status = receipt.status_code,
        attempts = receipt.attempts,
        "Notification sent"
    );

    Ok(())
}
