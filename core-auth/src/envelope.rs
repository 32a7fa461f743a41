//! Backend response envelope and error-message extraction.
//!
//! Successful responses wrap their payload as
//! `{ "data": ..., "meta": { "request_id": ... }, "error": null }`.
//! Failures come in two shapes: the same envelope with
//! `error: { code, message }`, or a framework error body `{ "detail": ... }`
//! where `detail` is a string or a list of validation items carrying `msg`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard response wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub meta: Option<EnvelopeMeta>,
    #[serde(default)]
    pub error: Option<EnvelopeError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `data` payload of login and register responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Decode the `data` member of an envelope body into `T`.
///
/// Returns a description of the problem when `data` is missing, null or of
/// the wrong shape.
pub fn decode_data<T: DeserializeOwned>(body: &Value) -> Result<T, String> {
    let envelope = ApiEnvelope::<T>::deserialize(body)
        .map_err(|e| format!("unexpected data shape: {}", e))?;

    envelope
        .data
        .ok_or_else(|| "response has no data".to_string())
}

type MessageExtractor = fn(&Value) -> Option<String>;

/// Tried in order; the first non-empty message wins.
const MESSAGE_EXTRACTORS: &[MessageExtractor] = &[structured_error_message, detail_message];

fn non_empty(message: &str) -> Option<String> {
    let trimmed = message.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `{ "error": { "message": "..." } }`
fn structured_error_message(body: &Value) -> Option<String> {
    body.get("error")?
        .get("message")?
        .as_str()
        .and_then(non_empty)
}

/// `{ "detail": "..." }` or `{ "detail": [{ "msg": "..." }, ...] }`
fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(message) => non_empty(message),
        Value::Array(items) => items
            .first()?
            .get("msg")?
            .as_str()
            .and_then(non_empty),
        _ => None,
    }
}

/// Derive the single display message for a failed call.
///
/// # Examples
///
/// ```
/// use core_auth::envelope::extract_error_message;
/// use serde_json::json;
///
/// let body = json!({"detail": "Email already registered"});
/// assert_eq!(
///     extract_error_message(Some(&body), "Registration failed"),
///     "Email already registered"
/// );
/// assert_eq!(extract_error_message(None, "Registration failed"), "Registration failed");
/// ```
pub fn extract_error_message(body: Option<&Value>, fallback: &str) -> String {
    body.and_then(|body| MESSAGE_EXTRACTORS.iter().find_map(|extract| extract(body)))
        .unwrap_or_else(|| fallback.to_string())
}
