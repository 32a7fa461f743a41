use core_api::ApiError;
use core_auth::envelope::extract_error_message;
use thiserror::Error;

/// Message shown when an assistant call fails without explanation
pub const ASSISTANT_FALLBACK_MESSAGE: &str = "The assistant is unavailable right now";

pub const QUESTION_VALIDATION_MESSAGE: &str = "Please enter a question";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssistantError {
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

impl AssistantError {
    pub(crate) fn from_api(error: &ApiError) -> Self {
        let message = extract_error_message(error.body(), ASSISTANT_FALLBACK_MESSAGE);
        match error {
            ApiError::Network { .. } => AssistantError::NetworkFailure { message },
            ApiError::Status { status: 401, .. } => AssistantError::Unauthorized { message },
            ApiError::Status { status, .. } => AssistantError::Rejected {
                status: *status,
                message,
            },
            ApiError::Encode(_) => AssistantError::MalformedResponse(message),
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            AssistantError::NetworkFailure { message }
            | AssistantError::Unauthorized { message }
            | AssistantError::Rejected { message, .. }
            | AssistantError::MalformedResponse(message)
            | AssistantError::Validation(message) => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AssistantError::Unauthorized { .. } => Some(401),
            AssistantError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;

/// Trimmed question, or `Validation` when nothing is left.
pub(crate) fn validated_question(question: &str) -> Result<&str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AssistantError::Validation(
            QUESTION_VALIDATION_MESSAGE.to_string(),
        ));
    }
    Ok(question)
}
