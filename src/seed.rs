// src/seed.rs

//! Startup seeding: the admin account and the bundled quiz set.
//! The same bundled set doubles as the client's offline fallback.

use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config, error::AppError, models::quiz::CreateQuizRequest, repository,
    utils::hash::hash_password,
};

const BUNDLED_QUIZZES: &str = include_str!("../data/quizzes.json");

/// A quiz from `data/quizzes.json`, keyed by its stable local id.
#[derive(Debug, Clone, Deserialize)]
pub struct BundledQuiz {
    pub id: i64,
    #[serde(flatten)]
    pub quiz: CreateQuizRequest,
}

pub fn bundled_quizzes() -> Result<Vec<BundledQuiz>, serde_json::Error> {
    serde_json::from_str(BUNDLED_QUIZZES)
}

/// Creates the admin user named in the config if it does not exist yet.
pub async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    if repository::user::find_by_username(pool, username).await?.is_none() {
        tracing::info!("Seeding admin user: {}", username);
        let hashed_password = hash_password(password)?;
        repository::user::create(pool, username, &hashed_password, "admin").await?;
        tracing::info!("Admin user created successfully.");
    }
    Ok(())
}

/// Inserts the bundled quizzes, published and owned by the first admin,
/// when the quiz table is empty. Returns how many were inserted.
pub async fn seed_quizzes(pool: &SqlitePool) -> Result<usize, AppError> {
    if repository::quiz::count(pool).await? > 0 {
        return Ok(0);
    }

    let Some(admin) = repository::user::find_admin(pool).await? else {
        tracing::warn!("No admin user, skipping quiz seeding");
        return Ok(0);
    };

    let bundled = bundled_quizzes()
        .map_err(|e| AppError::InternalServerError(format!("bundled quiz data: {}", e)))?;

    for entry in &bundled {
        entry.quiz.validate()?;
        let id = repository::quiz::create(pool, &entry.quiz, admin.id, true).await?;
        tracing::info!(
            quiz_id = id,
            questions = entry.quiz.questions.len(),
            "Seeded quiz '{}'",
            entry.quiz.title
        );
    }
    Ok(bundled.len())
}
