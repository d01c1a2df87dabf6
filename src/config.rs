// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Default number of rows returned by the public leaderboard.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Upper bound for the `limit` query parameter of the leaderboard.
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    /// Seed the bundled quizzes when the quiz table is empty.
    pub seed_quizzes: bool,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://quiz.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = parse_or("JWT_EXPIRATION", env::var("JWT_EXPIRATION").ok(), 86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_username = env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());

        let seed_quizzes = parse_or("SEED_QUIZZES", env::var("SEED_QUIZZES").ok(), true);

        let port = parse_or("PORT", env::var("PORT").ok(), 5000);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_username,
            admin_password,
            seed_quizzes,
            port,
        }
    }
}

/// Parses an optional environment value, falling back to `default` when unset.
/// A value that is set but malformed aborts startup.
fn parse_or<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{} has an invalid value: {:?}", name, value)),
        None => default,
    }
}
