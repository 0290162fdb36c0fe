//! Read-only view models for the presentation layer
//!
//! Everything here is derived data: the presentation layer renders these
//! structs and never touches the ledger directly. Rendering hints (bar width
//! and color) are computed deterministically from the score so the visual
//! output matches across frontends.

use serde::Serialize;

use crate::{
    Result,
    economy::{accrual_rate_per_hour, vote_power},
    ledger::LedgerStore,
};

/// Scores beyond this magnitude render at full bar width and depth of color.
const BAR_MAX_ABS_SCORE: i64 = 500;

/// Minimum bar width percentage, so a zero-score entry is still visible.
const BAR_MIN_WIDTH_PERCENT: f64 = 10.0;

/// Stats panel for the authenticated user.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct UserStatsView {
    /// Display username.
    pub username: String,
    /// Lowercased account email.
    pub email: String,
    /// Current leaderboard score under the user's name.
    pub score: i64,
    /// Score with an explicit sign for non-negative values (`+3`, `-7`).
    pub formatted_score: String,
    /// Multiplier the user's votes currently carry.
    pub vote_power: u32,
    /// Votes gained per hour at the current score.
    pub accrual_rate: u32,
    /// Spendable votes after settlement.
    pub vote_balance: u64,
}

/// One row of the ranked leaderboard.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LeaderboardRow {
    /// Display casing of the name.
    pub display_name: String,
    /// Signed score.
    pub score: i64,
    /// Score with an explicit `+` on positive values.
    pub formatted_score: String,
    /// Bar width as a percentage in `[10, 100]`.
    pub bar_width_percent: f64,
    /// CSS `hsl(...)` color for the bar.
    pub bar_color: String,
}

/// Build the stats view for `email`, settling accrual (and persisting)
/// first so the balance shown is current.
pub fn current_user_view(ledger: &mut LedgerStore, email: &str, now: u64) -> Result<UserStatsView> {
    ledger.settle_accrual(email, now)?;
    ledger.persist()?;

    let user = ledger.get_user(email)?;
    let username = user.username.clone();
    let vote_balance = user.vote_balance;
    let score = ledger.score_of(&username);

    Ok(UserStatsView {
        username,
        email: email.to_lowercase(),
        score,
        formatted_score: format_score(score),
        vote_power: vote_power(score),
        accrual_rate: accrual_rate_per_hour(score),
        vote_balance,
    })
}

/// All leaderboard entries sorted by descending score.
///
/// The sort is stable: entries with equal scores keep the order they were
/// first created in.
pub fn leaderboard_view(ledger: &LedgerStore) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = ledger
        .document()
        .leaderboard
        .values()
        .map(|entry| LeaderboardRow {
            display_name: entry.display_name.clone(),
            score: entry.score,
            formatted_score: format_score(entry.score),
            bar_width_percent: bar_width_percent(entry.score),
            bar_color: bar_color(entry.score),
        })
        .collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows
}

/// Positive scores carry an explicit `+` so rank changes read at a glance.
fn format_score(score: i64) -> String {
    if score > 0 {
        format!("+{score}")
    } else {
        score.to_string()
    }
}

/// Bar width scales linearly from 10% at zero to 100% at |score| >= 500.
fn bar_width_percent(score: i64) -> f64 {
    let abs = score.unsigned_abs().min(BAR_MAX_ABS_SCORE as u64) as f64;
    BAR_MIN_WIDTH_PERCENT + (abs / BAR_MAX_ABS_SCORE as f64) * (100.0 - BAR_MIN_WIDTH_PERCENT)
}

/// Green for positive, red for negative, neutral gray at zero; lightness
/// deepens from 90% to 50% as |score| approaches 500.
fn bar_color(score: i64) -> String {
    let clamped = score.clamp(-BAR_MAX_ABS_SCORE, BAR_MAX_ABS_SCORE);
    if clamped == 0 {
        return "hsl(220, 10%, 20%)".to_string();
    }
    let intensity = clamped.unsigned_abs() as f64 / BAR_MAX_ABS_SCORE as f64;
    let lightness = 90.0 - intensity * 40.0;
    let hue = if clamped > 0 { 120 } else { 0 };
    format!("hsl({hue}, 70%, {lightness}%)")
}
