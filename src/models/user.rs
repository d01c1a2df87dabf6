// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::stats::UserStats;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// User role: 'user' or 'admin'.
    pub role: String,

    pub completed_quizzes: i64,
    pub average_score: i64,
    pub total_points: i64,
    pub ranking: i64,
    pub total_users: i64,
}

impl User {
    pub fn stats(&self) -> UserStats {
        UserStats {
            completed_quizzes: self.completed_quizzes,
            average_score: self.average_score,
            total_points: self.total_points,
            ranking: self.ranking,
            total_users: self.total_users,
        }
    }
}

/// Public view of a user, with the embedded stats block.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub stats: UserStats,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            stats: user.stats(),
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub user: UserProfile,
}
