//! Received-email webhook notifier.
//!
//! Posts a [`NotificationEvent`](mailhook_common::types::NotificationEvent)
//! to an HTTP endpoint, reshaping the body for DingTalk robot webhooks, and
//! retries failed attempts with a fixed delay and a per-attempt timeout.

pub mod client;
pub mod error;
pub mod notifier;
pub mod payload;
pub mod retry;

pub use client::WebhookClient;
pub use error::{DeliveryError, ErrorKind};
pub use notifier::{DeliveryReceipt, Notifier};
pub use payload::WebhookBody;
pub use retry::{DeliveryOutcome, RetryPolicy};
