// src/utils/jwt.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the user id.
    pub sub: String,
    /// User's role ('user' or 'admin').
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    /// The authenticated user's id.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Passes when the caller is `owner_id` or an admin.
    pub fn ensure_owner_or_admin(&self, owner_id: i64, what: &str) -> Result<(), AppError> {
        if self.is_admin() || self.user_id()? == owner_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Not authorized to access this {}", what)))
        }
    }
}

/// Signs a new token for a user, valid for `expiration_seconds`.
pub fn sign_jwt(
    id: i64,
    role: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = Utc::now().timestamp() as usize + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        role: role.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a token string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Not authorized, token failed".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and injects `Claims`
/// into the request extensions. Rejections use the uniform error body.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::AuthError("Not authorized, no token".to_string()))?;

    let claims = verify_jwt(token, &config.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let token = sign_jwt(42, "user", "secret", 60).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = sign_jwt(42, "user", "secret", 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other"),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn test_owner_or_admin() {
        let user = Claims {
            sub: "5".to_string(),
            role: "user".to_string(),
            exp: 0,
        };
        assert!(user.ensure_owner_or_admin(5, "result").is_ok());
        assert!(matches!(
            user.ensure_owner_or_admin(6, "result"),
            Err(AppError::Forbidden(_))
        ));

        let admin = Claims {
            role: "admin".to_string(),
            ..user
        };
        assert!(admin.ensure_owner_or_admin(6, "result").is_ok());
    }
}
