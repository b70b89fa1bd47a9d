//! Error types for webhook delivery.

use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Failure of a single delivery attempt, or of a whole delivery once the
/// attempt budget is spent (in which case it is the last attempt's error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Connection, DNS or request failure before a response arrived.
    #[error("network request failed: {message}")]
    Network { message: String },

    /// The attempt did not complete within the per-attempt timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// A response arrived with a non-2xx status.
    #[error("HTTP error! status: {status_code}")]
    Status { status_code: u16 },

    /// The request body could not be serialized.
    #[error("failed to encode webhook body: {message}")]
    Encode { message: String },
}

/// Coarse classification of a [`DeliveryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or timeout failure; no response was observed.
    Transport,
    /// A response was observed but it was not a success.
    Status,
    /// The request was never sent.
    Encode,
}

impl DeliveryError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    pub fn status(status_code: u16) -> Self {
        Self::Status { status_code }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Status,
            Self::Encode { .. } => ErrorKind::Encode,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status carried by a [`DeliveryError::Status`], if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status_code } => Some(*status_code),
            _ => None,
        }
    }

    /// Whether another attempt may be made after this error.
    ///
    /// Every transport and status failure is retried, 4xx included; only a
    /// body that cannot be encoded is final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Encode)
    }
}

/// Timeouts are not mapped here because the configured duration is not
/// known from the error; [`WebhookClient::post`](crate::client::WebhookClient::post)
/// checks `is_timeout` first.
impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::status(status.as_u16());
        }
        if err.is_connect() {
            return Self::network(format!("connection failed: {err}"));
        }
        Self::network(err.to_string())
    }
}

impl From<serde_json::Error> for DeliveryError {
    fn from(err: serde_json::Error) -> Self {
        Self::encode(err.to_string())
    }
}
