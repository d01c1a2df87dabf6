// src/handlers/result.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    config::{DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT},
    error::{AppError, ErrorBody},
    models::{
        result::{QuizResult, ResultSummary, SubmitResultRequest, SubmitResultResponse},
        stats::{LeaderboardEntry, LeaderboardParams, UserStats},
    },
    repository,
    services::grading::grade_submission,
    utils::jwt::Claims,
};

/// Submits a finished attempt.
///
/// * Validates the payload and resolves the quiz.
/// * Grades every quiz question against the stored answer key.
/// * Persists the result, then recomputes the caller's stats and rank.
///
/// Nothing is written when validation or grading fails. If the stats
/// recompute fails, the saved result stays and the request still fails;
/// the next submission rebuilds the stats from scratch.
#[utoipa::path(
    post,
    path = "/api/results",
    request_body = SubmitResultRequest,
    responses(
        (status = 201, description = "Result saved", body = SubmitResultResponse),
        (status = 400, description = "Invalid submission", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Unknown quiz", body = ErrorBody),
        (status = 500, description = "Persistence failure", body = ErrorBody)
    )
)]
pub async fn submit_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SubmitResultRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let submission = payload.into_submission()?;
    let user_id = claims.user_id()?;

    let quiz = repository::quiz::find_by_id(&pool, submission.quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let graded = grade_submission(&quiz, &submission.answers)?;

    let result = repository::result::create(
        &pool,
        user_id,
        quiz.id,
        &graded,
        submission.time_taken,
    )
    .await
    .map_err(|e| {
        tracing::error!(user_id, quiz_id = quiz.id, "Failed to save result: {}", e);
        e
    })?;

    tracing::info!(
        result_id = result.id,
        user_id,
        quiz_id = quiz.id,
        score = result.score,
        total = result.total_points,
        "Result saved"
    );

    let stats = repository::stats::refresh_user_stats(&pool, user_id)
        .await
        .map_err(|e| {
            tracing::warn!(
                result_id = result.id,
                user_id,
                "Result saved but stats recompute failed: {}",
                e
            );
            AppError::InternalServerError(format!(
                "Result {} saved but statistics update failed: {}",
                result.id, e
            ))
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResultResponse {
            result,
            stats,
            correct_answers: graded.correct_answers,
            message: "Quiz result submitted successfully".to_string(),
        }),
    ))
}

/// Lists the caller's results, newest first.
#[utoipa::path(
    get,
    path = "/api/results",
    responses(
        (status = 200, description = "Caller's results", body = [ResultSummary]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
pub async fn list_my_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let results = repository::result::list_for_user(&pool, claims.user_id()?).await?;
    Ok(Json(results))
}

/// Returns one result. Owner or admin only.
#[utoipa::path(
    get,
    path = "/api/results/{id}",
    params(("id" = i64, Path, description = "Result id")),
    responses(
        (status = 200, description = "Result", body = QuizResult),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Unknown result", body = ErrorBody)
    )
)]
pub async fn get_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = repository::result::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    claims.ensure_owner_or_admin(result.user, "result")?;
    Ok(Json(result))
}

/// Returns the cached stats block of a user. Owner or admin only.
///
/// A user without results gets the zero-valued block.
#[utoipa::path(
    get,
    path = "/api/results/stats/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Stats snapshot", body = UserStats),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Unknown user", body = ErrorBody)
    )
)]
pub async fn get_user_stats(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    claims.ensure_owner_or_admin(user_id, "user's statistics")?;

    let user = repository::user::find_by_id(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    if user.completed_quizzes == 0 {
        return Ok(Json(serde_json::json!({
            "completedQuizzes": 0,
            "averageScore": 0,
            "totalPoints": 0,
            "ranking": 0
        })));
    }

    Ok(Json(serde_json::to_value(user.stats())?))
}

/// Public leaderboard in ranking order.
#[utoipa::path(
    get,
    path = "/api/results/leaderboard",
    params(("limit" = Option<i64>, Query, description = "Rows to return (1-100, default 10)")),
    responses((status = 200, description = "Top users", body = [LeaderboardEntry]))
)]
pub async fn get_leaderboard(
    State(pool): State<SqlitePool>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);

    let leaderboard = repository::stats::leaderboard(&pool, limit as usize).await?;
    Ok(Json(leaderboard))
}
