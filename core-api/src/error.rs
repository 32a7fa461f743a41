use serde_json::Value;
use thiserror::Error;

/// Failure channel of the request pipeline.
///
/// `Network` means no response arrived at all; `Status` carries whatever the
/// server sent back with a non-2xx code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP {status}")]
    Status { status: u16, body: Option<Value> },

    #[error("Failed to encode request body: {0}")]
    Encode(String),
}

impl ApiError {
    /// HTTP status, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded response body, if a response with content was received
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let err = ApiError::Status {
            status: 422,
            body: Some(json!({"detail": "bad"})),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.body(), Some(&json!({"detail": "bad"})));
        assert!(!err.is_unauthorized());

        let err = ApiError::Network {
            message: "Connection failed".to_string(),
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.body(), None);
        assert_eq!(err.to_string(), "Network error: Connection failed");
    }
}
