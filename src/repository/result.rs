// src/repository/result.rs

use chrono::{DateTime, Utc};
use sqlx::{SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::{
        result::{QuizResult, ResultAnswer, ResultSummary},
        stats::UserTotals,
    },
    services::{grading::GradedSubmission, stats::ScoreLine},
};

#[derive(sqlx::FromRow)]
struct ResultRow {
    id: i64,
    user_id: i64,
    quiz_id: i64,
    score: i64,
    total_points: i64,
    time_taken: i64,
    completed_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AnswerRow {
    question_id: i64,
    selected_options: Json<Vec<i64>>,
    is_correct: bool,
    points_earned: i64,
}

/// Persists a graded submission and its per-question answers atomically.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    quiz_id: i64,
    graded: &GradedSubmission,
    time_taken: i64,
) -> Result<QuizResult, AppError> {
    let completed_at = Utc::now();
    let mut tx = pool.begin().await?;

    let result_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO results (user_id, quiz_id, score, total_points, time_taken, completed_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(graded.score)
    .bind(graded.total_points)
    .bind(time_taken)
    .bind(completed_at)
    .fetch_one(&mut *tx)
    .await?;

    for (position, answer) in graded.answers.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO result_answers
                (result_id, position, question_id, selected_options, is_correct, points_earned)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result_id)
        .bind(position as i64)
        .bind(answer.question)
        .bind(Json(answer.selected_options.clone()))
        .bind(answer.is_correct)
        .bind(answer.points_earned)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(QuizResult {
        id: result_id,
        user: user_id,
        quiz: quiz_id,
        score: graded.score,
        total_points: graded.total_points,
        answers: graded.answers.clone(),
        time_taken,
        completed_at,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<QuizResult>, AppError> {
    let row = sqlx::query_as::<_, ResultRow>(
        r#"
        SELECT id, user_id, quiz_id, score, total_points, time_taken, completed_at
        FROM results
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let answers = sqlx::query_as::<_, AnswerRow>(
        r#"
        SELECT question_id, selected_options, is_correct, points_earned
        FROM result_answers
        WHERE result_id = ?
        ORDER BY position
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|a| ResultAnswer {
        question: a.question_id,
        selected_options: a.selected_options.0,
        is_correct: a.is_correct,
        points_earned: a.points_earned,
    })
    .collect();

    Ok(Some(QuizResult {
        id: row.id,
        user: row.user_id,
        quiz: row.quiz_id,
        score: row.score,
        total_points: row.total_points,
        answers,
        time_taken: row.time_taken,
        completed_at: row.completed_at,
    }))
}

/// The user's result history, newest first.
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ResultSummary>, AppError> {
    let results = sqlx::query_as::<_, ResultSummary>(
        r#"
        SELECT
            r.id, r.quiz_id,
            q.title AS quiz_title, q.category AS quiz_category,
            r.score, r.total_points, r.time_taken, r.completed_at
        FROM results r
        LEFT JOIN quizzes q ON q.id = r.quiz_id
        WHERE r.user_id = ?
        ORDER BY r.completed_at DESC, r.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(results)
}

/// Score lines of every result the user owns.
pub async fn score_lines(pool: &SqlitePool, user_id: i64) -> Result<Vec<ScoreLine>, AppError> {
    let lines = sqlx::query_as::<_, ScoreLine>(
        "SELECT score, total_points FROM results WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

/// Summed score and result count of every user, across the whole collection.
pub async fn user_totals(pool: &SqlitePool) -> Result<Vec<UserTotals>, AppError> {
    let totals = sqlx::query_as::<_, UserTotals>(
        r#"
        SELECT user_id, SUM(score) AS total_score, COUNT(*) AS result_count
        FROM results
        GROUP BY user_id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(totals)
}
