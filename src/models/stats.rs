// src/models/stats.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Materialized statistics cached on a user.
/// Always recomputed in full from the result set, never incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub completed_quizzes: i64,
    /// Rounded mean of the per-result percentages.
    pub average_score: i64,
    /// Points earned across all results.
    pub total_points: i64,
    /// 1-based leaderboard position, 0 while the user has no results.
    pub ranking: i64,
    /// Distinct users with at least one result.
    #[serde(default)]
    pub total_users: i64,
}

/// One user's totals across the whole result collection.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserTotals {
    pub user_id: i64,
    pub total_score: i64,
    pub result_count: i64,
}

/// Row of the public leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: i64,
    pub username: String,
    pub total_points: i64,
    pub completed_quizzes: i64,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}
