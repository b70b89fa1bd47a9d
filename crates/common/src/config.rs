use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;

/// Default number of delivery attempts per event.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default delay between attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Retry and timeout settings for webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookConfig {
    /// Total number of attempts, including the first (always >= 1)
    pub max_retries: u32,

    /// Upper bound on a single attempt
    pub timeout: Duration,

    /// Fixed wait between a failed attempt and the next one
    pub retry_delay: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Target webhook URL (only required by the `mailhook-notify` binary)
    pub webhook_url: Option<String>,

    /// Delivery retry settings
    pub webhook: WebhookConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Missing keys fall back to their defaults; present but malformed values
    /// are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_retries: u32 = parse_or(&lookup, "WEBHOOK_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        if max_retries == 0 {
            return Err(AppError::Config(
                "WEBHOOK_MAX_RETRIES must be at least 1".to_string(),
            ));
        }

        let timeout_ms: u64 = parse_or(&lookup, "WEBHOOK_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        let retry_delay_ms: u64 =
            parse_or(&lookup, "WEBHOOK_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?;

        let config = Self {
            webhook_url: lookup("WEBHOOK_URL").filter(|url| !url.trim().is_empty()),
            webhook: WebhookConfig {
                max_retries,
                timeout: Duration::from_millis(timeout_ms),
                retry_delay: Duration::from_millis(retry_delay_ms),
            },
        };

        tracing::debug!(
            max_retries,
            timeout_ms,
            retry_delay_ms,
            has_url = config.webhook_url.is_some(),
            "Loaded webhook configuration"
        );

        Ok(config)
    }

    /// The configured target URL, or a configuration error if unset.
    pub fn require_webhook_url(&self) -> Result<&str, AppError> {
        self.webhook_url.as_deref().ok_or_else(|| {
            AppError::Config("WEBHOOK_URL environment variable is required".to_string())
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} must be a valid unsigned integer"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.webhook, WebhookConfig::default());
        assert_eq!(config.webhook.max_retries, 3);
        assert_eq!(config.webhook.timeout, Duration::from_secs(10));
        assert_eq!(config.webhook.retry_delay, Duration::from_secs(1));
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("WEBHOOK_MAX_RETRIES", "5"),
            ("WEBHOOK_TIMEOUT_MS", "2500"),
            ("WEBHOOK_RETRY_DELAY_MS", "250"),
            ("WEBHOOK_URL", "https://hooks.example.com/mail"),
        ]))
        .unwrap();

        assert_eq!(config.webhook.max_retries, 5);
        assert_eq!(config.webhook.timeout, Duration::from_millis(2500));
        assert_eq!(config.webhook.retry_delay, Duration::from_millis(250));
        assert_eq!(
            config.require_webhook_url().unwrap(),
            "https://hooks.example.com/mail"
        );
    }

    #[test]
    fn test_zero_retries_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("WEBHOOK_MAX_RETRIES", "0")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_malformed_number_rejected() {
        let err =
            AppConfig::from_lookup(lookup_from(&[("WEBHOOK_TIMEOUT_MS", "ten")])).unwrap_err();
        assert_eq!(
            err,
            AppError::Config("WEBHOOK_TIMEOUT_MS must be a valid unsigned integer".to_string())
        );
    }

    #[test]
    fn test_blank_url_treated_as_missing() {
        let config = AppConfig::from_lookup(lookup_from(&[("WEBHOOK_URL", "  ")])).unwrap();
        assert!(matches!(
            config.require_webhook_url(),
            Err(AppError::Config(_))
        ));
    }
}
