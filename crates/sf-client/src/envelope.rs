//! Backend JSON envelope
//!
//! Every endpoint answers `{ success, data?, detail?, message? }`. A response
//! counts as successful only when the transport status is 2xx *and*
//! `success` is `true`.

use crate::error::ApiError;
use crate::transport::RawResponse;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Application-level success flag
    #[serde(default)]
    pub success: bool,
    /// Payload
    pub data: Option<T>,
    /// Error detail; usually a string, sometimes a validation error list
    #[serde(default)]
    pub detail: Option<Value>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Best available error text: `detail`, then `message`
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        let detail = self.detail.as_ref().and_then(|detail| match detail {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        });
        detail.or_else(|| {
            self.message
                .as_ref()
                .filter(|m| !m.trim().is_empty())
                .cloned()
        })
    }
}

/// Decode a raw response into its envelope, enforcing success
///
/// # Errors
/// - `ApiError::Status` for non-2xx responses
/// - `ApiError::Rejected` when `success` is not `true`
/// - `ApiError::Decode` when the body is not an envelope
pub fn decode_envelope<T: DeserializeOwned>(
    response: &RawResponse,
) -> Result<Envelope<T>, ApiError> {
    if !response.is_success() {
        let message = serde_json::from_str::<Envelope<Value>>(&response.body)
            .ok()
            .and_then(|env| env.error_message())
            .unwrap_or_else(|| format!("request failed with status {}", response.status));
        return Err(ApiError::status(response.status, message));
    }

    let envelope: Envelope<T> = serde_json::from_str(&response.body)
        .map_err(|err| ApiError::Decode(err.to_string()))?;
    if !envelope.success {
        let message = envelope
            .error_message()
            .unwrap_or_else(|| "request was not successful".to_string());
        return Err(ApiError::Rejected(message));
    }
    Ok(envelope)
}

/// Decode a response and return its `data`
///
/// # Errors
/// As [`decode_envelope`], plus `ApiError::Decode` when `data` is absent.
pub fn decode_data<T: DeserializeOwned>(response: &RawResponse) -> Result<T, ApiError> {
    decode_envelope::<T>(response)?
        .data
        .ok_or_else(|| ApiError::Decode("response envelope has no data".to_string()))
}
