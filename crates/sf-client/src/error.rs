//! Error types for backend access
//!
//! Covers:
//! - Transport failures (unreachable backend, timeouts)
//! - Non-2xx responses
//! - Application-level rejections (`success: false` on a 2xx)
//! - Undecodable payloads
//! - Missing session and bad configuration

/// Errors returned by backend calls
///
/// `Clone` so that callers coalesced onto one in-flight request can all
/// receive the failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Backend unreachable or connection dropped
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx status
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the envelope, or a generic fallback
        message: String,
    },

    /// 2xx response whose envelope reports `success != true`
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Body could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),

    /// Caller passed an unusable identifier or parameter
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No access token available
    #[error("not authenticated")]
    Unauthenticated,

    /// Client misconfigured
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Create a status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Human-readable message suitable for a toast
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(message)
            | Self::Status { message, .. }
            | Self::Rejected(message)
            | Self::Decode(message)
            | Self::InvalidArgument(message)
            | Self::Config(message) => message.clone(),
            Self::Unauthenticated => "Please sign in again.".to_string(),
        }
    }

    /// Whether a manual retry could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status, when the backend answered
    #[inline]
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::status(status.as_u16(), err.to_string()),
            None if err.is_decode() => Self::Decode(err.to_string()),
            None if err.is_builder() => Self::Config(err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;
