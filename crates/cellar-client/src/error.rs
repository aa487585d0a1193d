// Error types for CellarClient

/// Errors surfaced by cellar client operations
#[derive(Debug, thiserror::Error)]
pub enum CellarError {
    #[error("Request failed with status {status}: {body}")]
    Status {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

impl CellarError {
    /// HTTP status carried by the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            CellarError::Status { status, .. } => Some(*status),
            CellarError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the error came from the timeout bound of the request
    pub fn is_timeout(&self) -> bool {
        matches!(self, CellarError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, CellarError>;
