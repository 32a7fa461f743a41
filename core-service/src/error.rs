use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Assistant error: {0}")]
    Assistant(#[from] core_assistant::AssistantError),
}

impl CoreError {
    /// Display string for the UI.
    ///
    /// Setup failures have no user-facing wording and use their `Display`
    /// text.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Auth(e) => e.user_message().to_string(),
            CoreError::Assistant(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
