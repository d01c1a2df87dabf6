// src/repository/quiz.rs

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::quiz::{CreateQuizRequest, Question, QuestionDetails, QuestionType, Quiz, QuizOption},
};

#[derive(sqlx::FromRow)]
struct QuizRow {
    id: i64,
    title: String,
    description: String,
    category: String,
    time_limit: i64,
    is_published: bool,
    created_by: i64,
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    quiz_id: i64,
    question_type: String,
    question_text: String,
    points: i64,
    explanation: String,
    details: Option<Json<QuestionDetails>>,
}

#[derive(sqlx::FromRow)]
struct OptionRow {
    id: i64,
    question_id: i64,
    text: String,
    is_correct: bool,
}

const QUIZ_COLUMNS: &str =
    "SELECT id, title, description, category, time_limit, is_published, created_by FROM quizzes";

/// Fetches one quiz with its ordered questions and options.
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Quiz>, AppError> {
    let row = sqlx::query_as::<_, QuizRow>(&format!("{} WHERE id = ?", QUIZ_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut quizzes = load_content(pool, vec![row]).await?;
    Ok(quizzes.pop())
}

/// Lists every published quiz, newest first.
pub async fn list_published(pool: &SqlitePool) -> Result<Vec<Quiz>, AppError> {
    let rows = sqlx::query_as::<_, QuizRow>(&format!(
        "{} WHERE is_published = TRUE ORDER BY id DESC",
        QUIZ_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    load_content(pool, rows).await
}

/// Attaches questions and options to the given quiz rows, keeping row order.
async fn load_content(pool: &SqlitePool, rows: Vec<QuizRow>) -> Result<Vec<Quiz>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut query_builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, quiz_id, question_type, question_text, points, explanation, details
         FROM questions WHERE quiz_id IN (",
    );
    let mut separated = query_builder.separated(",");
    for row in &rows {
        separated.push_bind(row.id);
    }
    separated.push_unseparated(") ORDER BY quiz_id, position");

    let question_rows: Vec<QuestionRow> = query_builder.build_query_as().fetch_all(pool).await?;

    let mut options_by_question: HashMap<i64, Vec<QuizOption>> = HashMap::new();
    if !question_rows.is_empty() {
        let mut query_builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, question_id, text, is_correct FROM options WHERE question_id IN (",
        );
        let mut separated = query_builder.separated(",");
        for q in &question_rows {
            separated.push_bind(q.id);
        }
        separated.push_unseparated(") ORDER BY question_id, position");

        let option_rows: Vec<OptionRow> = query_builder.build_query_as().fetch_all(pool).await?;
        for o in option_rows {
            options_by_question
                .entry(o.question_id)
                .or_default()
                .push(QuizOption {
                    id: o.id,
                    text: o.text,
                    is_correct: o.is_correct,
                });
        }
    }

    let mut questions_by_quiz: HashMap<i64, Vec<Question>> = HashMap::new();
    for q in question_rows {
        let question_type = q.question_type.parse::<QuestionType>().map_err(|e| {
            AppError::InternalServerError(format!("question {}: {}", q.id, e))
        })?;
        questions_by_quiz.entry(q.quiz_id).or_default().push(Question {
            id: q.id,
            question_text: q.question_text,
            question_type,
            options: options_by_question.remove(&q.id).unwrap_or_default(),
            points: q.points,
            explanation: q.explanation,
            details: q.details.map(|d| d.0).unwrap_or_default(),
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| Quiz {
            questions: questions_by_quiz.remove(&row.id).unwrap_or_default(),
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            time_limit: row.time_limit,
            is_published: row.is_published,
            created_by: row.created_by,
        })
        .collect())
}

/// Inserts the questions (and their options) of `req` under `quiz_id`.
async fn insert_questions(
    conn: &mut SqliteConnection,
    quiz_id: i64,
    req: &CreateQuizRequest,
) -> Result<(), sqlx::Error> {
    for (position, question) in req.questions.iter().enumerate() {
        let details = (!question.details.is_empty()).then(|| Json(question.details.clone()));

        let question_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO questions
                (quiz_id, position, question_type, question_text, points, explanation, details)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(quiz_id)
        .bind(position as i64)
        .bind(question.question_type.as_str())
        .bind(&question.question_text)
        .bind(question.points)
        .bind(&question.explanation)
        .bind(details)
        .fetch_one(&mut *conn)
        .await?;

        for (option_position, option) in question.options.iter().enumerate() {
            sqlx::query(
                "INSERT INTO options (question_id, position, text, is_correct) VALUES (?, ?, ?, ?)",
            )
            .bind(question_id)
            .bind(option_position as i64)
            .bind(&option.text)
            .bind(option.is_correct)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

/// Creates a quiz with all its questions in one transaction. Returns the new id.
pub async fn create(
    pool: &SqlitePool,
    req: &CreateQuizRequest,
    created_by: i64,
    is_published: bool,
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let quiz_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quizzes (title, description, category, time_limit, is_published, created_by)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.category)
    .bind(req.time_limit)
    .bind(is_published)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await?;

    insert_questions(&mut *tx, quiz_id, req).await?;

    tx.commit().await?;
    Ok(quiz_id)
}

/// Replaces the content of a quiz. Questions and options get new ids.
pub async fn replace(pool: &SqlitePool, id: i64, req: &CreateQuizRequest) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE quizzes SET title = ?, description = ?, category = ?, time_limit = ? WHERE id = ?",
    )
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.category)
    .bind(req.time_limit)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM questions WHERE quiz_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    insert_questions(&mut *tx, id, req).await?;

    tx.commit().await?;
    Ok(())
}

/// Returns the creator of a quiz, or `None` if it does not exist.
pub async fn owner_of(pool: &SqlitePool, id: i64) -> Result<Option<i64>, AppError> {
    let owner = sqlx::query_scalar("SELECT created_by FROM quizzes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(owner)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Flips `is_published` and returns the new value.
pub async fn toggle_published(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let published = sqlx::query_scalar(
        "UPDATE quizzes SET is_published = NOT is_published WHERE id = ? RETURNING is_published",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;
    Ok(published)
}

pub async fn count(pool: &SqlitePool) -> Result<i64, AppError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
