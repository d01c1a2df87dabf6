// src/services/stats.rs

//! Pure recomputation of a user's statistics snapshot.
//!
//! Every submission rebuilds the snapshot from the full result set: the
//! user's own results for the counters, and the per-user totals of the whole
//! collection for the ranking. Cost grows with the number of results.

use std::cmp::Ordering;

use crate::models::stats::{UserStats, UserTotals};

/// Score and point pool of one stored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ScoreLine {
    pub score: i64,
    pub total_points: i64,
}

/// Leaderboard order: summed score descending, then result count descending.
/// User id ascending keeps the order total.
fn leaderboard_order(a: &UserTotals, b: &UserTotals) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| b.result_count.cmp(&a.result_count))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Sorts totals into leaderboard order. Users without results are dropped.
pub fn rank_users(mut totals: Vec<UserTotals>) -> Vec<UserTotals> {
    totals.retain(|t| t.result_count > 0);
    totals.sort_by(leaderboard_order);
    totals
}

/// 1-based position of `user_id` in `ranked`, or 0 when absent.
pub fn rank_of(user_id: i64, ranked: &[UserTotals]) -> i64 {
    ranked
        .iter()
        .position(|t| t.user_id == user_id)
        .map(|i| i as i64 + 1)
        .unwrap_or(0)
}

/// Rounded mean of per-result percentages (not a pooled percentage).
pub fn average_score(results: &[ScoreLine]) -> i64 {
    if results.is_empty() {
        return 0;
    }
    let sum: f64 = results
        .iter()
        .map(|r| {
            if r.total_points > 0 {
                r.score as f64 / r.total_points as f64 * 100.0
            } else {
                0.0
            }
        })
        .sum();
    (sum / results.len() as f64).round() as i64
}

/// Builds the stats snapshot for `user_id`.
///
/// * `user_results`: every result of that user.
/// * `all_totals`: summed score and result count of every user, in any order.
pub fn compute_stats(
    user_id: i64,
    user_results: &[ScoreLine],
    all_totals: Vec<UserTotals>,
) -> UserStats {
    let ranked = rank_users(all_totals);

    UserStats {
        completed_quizzes: user_results.len() as i64,
        average_score: average_score(user_results),
        total_points: user_results
            .iter()
            .fold(0i64, |sum, r| sum.saturating_add(r.score)),
        ranking: rank_of(user_id, &ranked),
        total_users: ranked.len() as i64,
    }
}
