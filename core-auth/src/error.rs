use core_api::ApiError;
use thiserror::Error;

/// Message shown when a failed login carries no usable explanation
pub const LOGIN_FALLBACK_MESSAGE: &str = "Invalid email or password";

/// Message shown when a failed registration carries no usable explanation
pub const REGISTER_FALLBACK_MESSAGE: &str = "Registration failed";

/// Message shown when the profile check fails without explanation
pub const PROFILE_FALLBACK_MESSAGE: &str = "Unable to load profile";

/// Shown when the login form is submitted with a blank field
pub const LOGIN_VALIDATION_MESSAGE: &str = "Please fill in all fields";

/// Shown when the registration form is submitted with a blank required field
pub const REGISTER_VALIDATION_MESSAGE: &str = "Please fill in all required fields";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Network failure: {message}")]
    NetworkFailure { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Request rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Validation(String),
}

impl AuthError {
    /// Classify a pipeline failure.
    ///
    /// `message` is the display string already derived from the response.
    pub fn from_api(error: &ApiError, message: String) -> Self {
        match error {
            ApiError::Network { .. } => AuthError::NetworkFailure { message },
            ApiError::Status { status: 401, .. } => AuthError::Unauthorized { message },
            ApiError::Status { status, .. } => AuthError::Rejected {
                status: *status,
                message,
            },
            ApiError::Encode(_) => AuthError::MalformedResponse(message),
        }
    }

    /// The one string the UI shows for this failure
    pub fn user_message(&self) -> &str {
        match self {
            AuthError::NetworkFailure { message }
            | AuthError::Unauthorized { message }
            | AuthError::Rejected { message, .. } => message,
            AuthError::MalformedResponse(message) | AuthError::Validation(message) => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Unauthorized { .. } => Some(401),
            AuthError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_classification() {
        let network = ApiError::Network {
            message: "refused".to_string(),
        };
        assert!(matches!(
            AuthError::from_api(&network, "m".to_string()),
            AuthError::NetworkFailure { .. }
        ));

        let unauthorized = ApiError::Status {
            status: 401,
            body: None,
        };
        assert_eq!(
            AuthError::from_api(&unauthorized, "m".to_string()).status(),
            Some(401)
        );

        let rejected = ApiError::Status {
            status: 422,
            body: None,
        };
        assert_eq!(
            AuthError::from_api(&rejected, "Bad input".to_string()),
            AuthError::Rejected {
                status: 422,
                message: "Bad input".to_string()
            }
        );
    }

    #[test]
    fn test_encode_failure_keeps_display_message() {
        let encode = ApiError::Encode("key must be a string".to_string());
        let error = AuthError::from_api(&encode, REGISTER_FALLBACK_MESSAGE.to_string());

        assert!(matches!(error, AuthError::MalformedResponse(_)));
        assert_eq!(error.user_message(), REGISTER_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_user_message_for_every_variant() {
        let errors = [
            AuthError::NetworkFailure {
                message: "a".to_string(),
            },
            AuthError::Unauthorized {
                message: "a".to_string(),
            },
            AuthError::Rejected {
                status: 500,
                message: "a".to_string(),
            },
            AuthError::MalformedResponse("a".to_string()),
            AuthError::Validation("a".to_string()),
        ];

        for error in errors {
            assert_eq!(error.user_message(), "a");
        }
    }
}
