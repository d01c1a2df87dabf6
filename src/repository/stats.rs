// src/repository/stats.rs

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::stats::{LeaderboardEntry, UserStats},
    repository::{result, user},
    services::stats::{compute_stats, rank_users},
};

/// Recomputes the user's stats from the full result set and overwrites the
/// cached block. Reads must see the freshly committed result, so the queries
/// run one after another.
pub async fn refresh_user_stats(pool: &SqlitePool, user_id: i64) -> Result<UserStats, AppError> {
    let lines = result::score_lines(pool, user_id).await?;
    let totals = result::user_totals(pool).await?;

    let stats = compute_stats(user_id, &lines, totals);
    user::store_stats(pool, user_id, &stats).await?;

    tracing::debug!(
        user_id,
        completed = stats.completed_quizzes,
        ranking = stats.ranking,
        "User stats recomputed"
    );
    Ok(stats)
}

/// Top `limit` users in ranking order.
pub async fn leaderboard(
    pool: &SqlitePool,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let ranked = rank_users(result::user_totals(pool).await?);
    let top: Vec<_> = ranked.into_iter().take(limit).collect();

    let ids: Vec<i64> = top.iter().map(|t| t.user_id).collect();
    let mut names = user::usernames(pool, &ids).await?;

    Ok(top
        .into_iter()
        .enumerate()
        .map(|(i, t)| LeaderboardEntry {
            rank: i as i64 + 1,
            user_id: t.user_id,
            username: names.remove(&t.user_id).unwrap_or_default(),
            total_points: t.total_score,
            completed_quizzes: t.result_count,
        })
        .collect())
}
