// src/handlers/auth.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, LoginResponse, UserProfile},
    repository,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user profile (no password).
pub async fn register(
    State(pool): State<SqlitePool>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;
    let user = repository::user::create(&pool, &payload.username, &hashed_password, "user").await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

/// Authenticates a user and returns a bearer token with the cached stats.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = repository::user::find_by_username(&pool, &payload.username)
        .await?
        .ok_or(AppError::AuthError("Invalid username or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid username or password".to_string()));
    }

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user: UserProfile::from(&user),
    }))
}
