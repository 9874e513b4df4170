//! Daily reward with consecutive-day streaks.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

pub const BASE_COINS: i64 = 50;
pub const STREAK_BONUS_PER_DAY: i64 = 10;
pub const MAX_STREAK_BONUS: i64 = 200;

/// Streak length from which the claim message adds a congratulation line.
const CELEBRATED_STREAK: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyGrant {
    pub streak: i64,
    pub base: i64,
    pub streak_bonus: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyOutcome {
    AlreadyClaimed { streak: i64, hours_left: i64 },
    Claimable(DailyGrant),
}

/// Decide whether a daily claim is allowed at `now`.
///
/// Days are calendar days in `offset`, not rolling 24h windows: a claim at
/// 23:59 followed by one at 00:01 continues the streak.
pub fn evaluate(
    last_claim: Option<DateTime<Utc>>,
    current_streak: i64,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> DailyOutcome {
    let today = local_day(now, offset);

    let streak = match last_claim.map(|t| local_day(t, offset)) {
        Some(last_day) if last_day >= today => {
            return DailyOutcome::AlreadyClaimed {
                streak: current_streak,
                hours_left: hours_until_next_day(now, offset),
            };
        }
        Some(last_day) if today.pred_opt() == Some(last_day) => current_streak.max(0) + 1,
        _ => 1,
    };

    DailyOutcome::Claimable(grant_for_streak(streak))
}

pub fn grant_for_streak(streak: i64) -> DailyGrant {
    let streak_bonus = ((streak - 1).max(0) * STREAK_BONUS_PER_DAY).min(MAX_STREAK_BONUS);
    DailyGrant {
        streak,
        base: BASE_COINS,
        streak_bonus,
        total: BASE_COINS + streak_bonus,
    }
}

pub fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Whole hours (rounded up) until the next local midnight.
pub fn hours_until_next_day(now: DateTime<Utc>, offset: FixedOffset) -> i64 {
    let next_midnight = local_day(now, offset)
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|ndt| offset.from_local_datetime(&ndt).single());

    match next_midnight {
        Some(midnight) => {
            let secs = (midnight.with_timezone(&Utc) - now).num_seconds().max(0);
            (secs + 3599) / 3600
        }
        None => 24,
    }
}

pub fn render_claimed(grant: &DailyGrant, balance: i64) -> String {
    let mut message = String::from("🎁 *DAILY REWARD*\n\n");
    message.push_str(&format!("💰 Base: +{} coins\n", grant.base));
    if grant.streak_bonus > 0 {
        message.push_str(&format!("🔥 Streak bonus: +{} coins\n", grant.streak_bonus));
    }
    message.push_str("━━━━━━━━━━━━━━━\n");
    message.push_str(&format!("✨ Total: *+{} coins*\n\n", grant.total));
    message.push_str(&format!("🔥 Streak: {} {}\n", grant.streak, days(grant.streak)));
    message.push_str(&format!("💵 Balance: {balance} coins"));

    if grant.streak >= CELEBRATED_STREAK {
        message.push_str(&format!("\n\n🏆 Amazing! {} days in a row!", grant.streak));
    }
    message
}

pub fn render_already_claimed(streak: i64, hours_left: i64) -> String {
    format!(
        "⏰ You already claimed today!\n\n🔥 Current streak: {streak} {}\n⏳ Next claim in: ~{hours_left}h",
        days(streak)
    )
}

fn days(n: i64) -> &'static str {
    if n == 1 { "day" } else { "days" }
}
