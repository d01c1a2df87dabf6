// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::AppError, models::stats::UserStats};

/// One answered question in a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_option_ids: Vec<i64>,
}

/// DTO for submitting a finished attempt.
///
/// Every field is optional at the serde level so that a missing field is
/// reported through the uniform validation error instead of an extractor rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultRequest {
    #[validate(required(message = "quizId is required"))]
    pub quiz_id: Option<i64>,

    /// Unanswered questions are simply absent.
    #[validate(
        required(message = "answers must be a non-empty list"),
        length(min = 1, message = "answers must be a non-empty list")
    )]
    pub answers: Option<Vec<SubmittedAnswer>>,

    /// Seconds spent on the attempt.
    #[validate(
        required(message = "timeTaken is required"),
        range(min = 0, message = "timeTaken cannot be negative")
    )]
    pub time_taken: Option<i64>,
}

/// A submission whose required fields are known to be present.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub quiz_id: i64,
    pub answers: Vec<SubmittedAnswer>,
    pub time_taken: i64,
}

impl SubmitResultRequest {
    /// Runs field validation and unwraps the request into a `Submission`.
    pub fn into_submission(self) -> Result<Submission, AppError> {
        self.validate()?;

        let (Some(quiz_id), Some(answers), Some(time_taken)) =
            (self.quiz_id, self.answers, self.time_taken)
        else {
            return Err(AppError::BadRequest(
                "quizId, answers and timeTaken are required".to_string(),
            ));
        };

        if answers.iter().any(|a| a.selected_option_ids.is_empty()) {
            return Err(AppError::BadRequest(
                "selectedOptionIds must be a non-empty list".to_string(),
            ));
        }

        Ok(Submission {
            quiz_id,
            answers,
            time_taken,
        })
    }
}

/// Graded entry for one quiz question, as stored on a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultAnswer {
    pub question: i64,
    pub selected_options: Vec<i64>,
    pub is_correct: bool,
    pub points_earned: i64,
}

/// A persisted, graded attempt. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: i64,
    pub user: i64,
    pub quiz: i64,
    pub score: i64,
    pub total_points: i64,
    pub answers: Vec<ResultAnswer>,
    pub time_taken: i64,
    pub completed_at: DateTime<Utc>,
}

/// Review entry so the client can render feedback without the raw answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectAnswer {
    pub question_id: i64,
    pub correct_option_ids: Vec<i64>,
    pub selected_option_ids: Vec<i64>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultResponse {
    pub result: QuizResult,
    pub stats: UserStats,
    pub correct_answers: Vec<CorrectAnswer>,
    pub message: String,
}

/// Row of the caller's result history.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub id: i64,
    pub quiz_id: i64,
    /// `None` when the quiz has been deleted since.
    pub quiz_title: Option<String>,
    pub quiz_category: Option<String>,
    pub score: i64,
    pub total_points: i64,
    pub time_taken: i64,
    pub completed_at: DateTime<Utc>,
}
