use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Completion request timed out after {0}s")]
    Timeout(u64),

    #[error("Completion request cancelled")]
    Cancelled,
}

impl ChatError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Failures of the completion round-trip, as opposed to local storage.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Llm(_) | Self::Http(_) | Self::Timeout(_) | Self::Cancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
