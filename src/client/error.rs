// src/client/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("quiz {0} not found")]
    NotFound(i64),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),

    #[error("quiz {0} has no questions")]
    EmptyQuiz(i64),

    #[error("attempt was already submitted")]
    AlreadySubmitted,
}

impl ClientError {
    /// Auth failures are never papered over by the offline fallback.
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}
