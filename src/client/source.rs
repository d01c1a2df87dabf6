// src/client/source.rs

use async_trait::async_trait;

use crate::{
    client::error::ClientError,
    models::{
        quiz::Quiz,
        result::{SubmitResultRequest, SubmitResultResponse},
    },
};

/// Where a loaded quiz came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOrigin {
    Server,
    /// Bundled offline copy. Its ids are local and unknown to the server.
    Fallback,
}

/// Anything that can hand out a quiz, answer key included.
#[async_trait]
pub trait QuizSource: Send + Sync {
    fn origin(&self) -> QuizOrigin;

    async fn fetch_quiz(&self, quiz_id: i64) -> Result<Quiz, ClientError>;
}

#[async_trait]
pub trait ResultSubmitter: Send + Sync {
    async fn submit(
        &self,
        payload: &SubmitResultRequest,
    ) -> Result<SubmitResultResponse, ClientError>;
}

#[derive(Debug, Clone)]
pub struct LoadedQuiz {
    pub quiz: Quiz,
    pub origin: QuizOrigin,
}

/// Loads a quiz from `primary`, degrading to `fallback` on failure.
///
/// Authorization failures and a definite miss on the primary are returned
/// as-is. If neither source has the quiz the result is `ClientError::NotFound`.
pub async fn load_quiz(
    primary: &dyn QuizSource,
    fallback: &dyn QuizSource,
    quiz_id: i64,
) -> Result<LoadedQuiz, ClientError> {
    let primary_err = match primary.fetch_quiz(quiz_id).await {
        Ok(quiz) => {
            return Ok(LoadedQuiz {
                quiz,
                origin: primary.origin(),
            });
        }
        Err(e) if e.is_auth() => return Err(e),
        Err(e @ ClientError::NotFound(_)) => return Err(e),
        Err(e) => e,
    };

    tracing::warn!(quiz_id, "Primary quiz source failed, using fallback: {}", primary_err);

    match fallback.fetch_quiz(quiz_id).await {
        Ok(quiz) => Ok(LoadedQuiz {
            quiz,
            origin: fallback.origin(),
        }),
        Err(e) => {
            tracing::debug!(quiz_id, "Fallback quiz source failed: {}", e);
            Err(ClientError::NotFound(quiz_id))
        }
    }
}
