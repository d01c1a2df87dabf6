// src/repository/user.rs

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{error::AppError, models::{stats::UserStats, user::User}};

const USER_COLUMNS: &str = "SELECT id, username, password, role, completed_quizzes, \
     average_score, total_points, ranking, total_users FROM users";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE username = ?", USER_COLUMNS))
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Any admin account, used as owner of seeded quizzes.
pub async fn find_admin(pool: &SqlitePool) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "{} WHERE role = 'admin' ORDER BY id LIMIT 1",
        USER_COLUMNS
    ))
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Inserts a user. A duplicate username surfaces as `AppError::Conflict`.
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: &str,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password, role)
        VALUES (?, ?, ?)
        RETURNING id, username, password, role,
            completed_quizzes, average_score, total_points, ranking, total_users
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Username '{}' already exists", username))
        }
        _ => {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::from(e)
        }
    })
}

/// Overwrites the whole stats block of a user.
pub async fn store_stats(
    pool: &SqlitePool,
    user_id: i64,
    stats: &UserStats,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET completed_quizzes = ?, average_score = ?, total_points = ?, ranking = ?, total_users = ?
        WHERE id = ?
        "#,
    )
    .bind(stats.completed_quizzes)
    .bind(stats.average_score)
    .bind(stats.total_points)
    .bind(stats.ranking)
    .bind(stats.total_users)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Maps user ids to usernames.
pub async fn usernames(pool: &SqlitePool, ids: &[i64]) -> Result<HashMap<i64, String>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query_builder =
        QueryBuilder::<Sqlite>::new("SELECT id, username FROM users WHERE id IN (");
    let mut separated = query_builder.separated(",");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows: Vec<(i64, String)> = query_builder.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().collect())
}
