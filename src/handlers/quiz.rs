// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, ErrorBody},
    models::quiz::{CreateQuizRequest, PublicQuiz, Quiz},
    repository,
    utils::{html::sanitize_quiz, jwt::Claims},
};

async fn load_quiz(pool: &SqlitePool, id: i64) -> Result<Quiz, AppError> {
    repository::quiz::find_by_id(pool, id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

/// Checks that the quiz exists and the caller may modify it.
async fn authorize_quiz_owner(pool: &SqlitePool, id: i64, claims: &Claims) -> Result<(), AppError> {
    let owner = repository::quiz::owner_of(pool, id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;
    claims.ensure_owner_or_admin(owner, "quiz")
}

/// Lists published quizzes without correctness flags.
#[utoipa::path(
    get,
    path = "/api/quizzes",
    responses((status = 200, description = "Published quizzes", body = [PublicQuiz]))
)]
pub async fn list_quizzes(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let quizzes: Vec<PublicQuiz> = repository::quiz::list_published(&pool)
        .await?
        .into_iter()
        .map(PublicQuiz::from)
        .collect();

    Ok(Json(quizzes))
}

/// Returns one quiz without correctness flags.
#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    params(("id" = i64, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz without answer key", body = PublicQuiz),
        (status = 404, description = "Unknown quiz", body = ErrorBody)
    )
)]
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = load_quiz(&pool, id).await?;
    Ok(Json(PublicQuiz::from(quiz)))
}

/// Returns the full quiz, answer key included, for an authenticated attempt.
#[utoipa::path(
    get,
    path = "/api/quizzes/{id}/attempt",
    params(("id" = i64, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz with correctness flags", body = Quiz),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Unknown quiz", body = ErrorBody)
    )
)]
pub async fn get_quiz_for_attempt(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = load_quiz(&pool, id).await?;
    Ok(Json(quiz))
}

/// Creates an unpublished quiz owned by the caller.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    payload.validate()?;
    sanitize_quiz(&mut payload);

    let user_id = claims.user_id()?;
    let id = repository::quiz::create(&pool, &payload, user_id, false).await?;
    tracing::info!(quiz_id = id, user_id, "Quiz created");

    let quiz = load_quiz(&pool, id).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Replaces a quiz's content. Owner or admin only.
pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    payload: Result<Json<CreateQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut payload) = payload?;
    authorize_quiz_owner(&pool, id, &claims).await?;
    payload.validate()?;
    sanitize_quiz(&mut payload);

    repository::quiz::replace(&pool, id, &payload).await?;

    let quiz = load_quiz(&pool, id).await?;
    Ok(Json(quiz))
}

/// Deletes a quiz. Owner or admin only. Existing results are kept.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    authorize_quiz_owner(&pool, id, &claims).await?;
    repository::quiz::delete(&pool, id).await?;

    tracing::info!(quiz_id = id, "Quiz removed");
    Ok(Json(serde_json::json!({ "message": "Quiz removed" })))
}

/// Toggles the published flag. Owner or admin only.
pub async fn toggle_publish(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    authorize_quiz_owner(&pool, id, &claims).await?;
    repository::quiz::toggle_published(&pool, id).await?;

    let quiz = load_quiz(&pool, id).await?;
    Ok(Json(quiz))
}
