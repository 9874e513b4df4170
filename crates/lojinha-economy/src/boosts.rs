//! XP boosts bought in the shop.

use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_DURATION_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostSpec {
    pub multiplier: f64,
    pub duration_hours: i64,
}

impl BoostSpec {
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::hours(self.duration_hours)
    }
}

/// Effective multiplier from the user's unexpired boosts.
///
/// Boosts do not stack: the strongest one wins. No boosts means 1.0.
pub fn max_multiplier<I>(active: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    active
        .into_iter()
        .fold(None, |best: Option<f64>, m| Some(best.map_or(m, |b| b.max(m))))
        .unwrap_or(1.0)
}

/// Read multiplier and duration out of a product name such as
/// `"Boost XP 2x (24h)"`. Missing parts fall back to 1.5x for 1 hour.
pub fn parse_boost_name(name: &str) -> BoostSpec {
    BoostSpec {
        multiplier: parse_multiplier(name).unwrap_or(DEFAULT_MULTIPLIER),
        duration_hours: parse_duration_hours(name).unwrap_or(DEFAULT_DURATION_HOURS),
    }
}

/// First run of digits/dots immediately followed by a lowercase `x`.
fn parse_multiplier(name: &str) -> Option<f64> {
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c != 'x' {
            continue;
        }
        let start = chars[..i]
            .iter()
            .rposition(|ch| !(ch.is_ascii_digit() || *ch == '.'))
            .map_or(0, |p| p + 1);
        if start == i {
            continue;
        }
        let run: String = chars[start..i].iter().collect();
        return run.parse().ok();
    }
    None
}

/// Digits between `(` and `h)`.
fn parse_duration_hours(name: &str) -> Option<i64> {
    name.match_indices('(').find_map(|(open, _)| {
        let rest = &name[open + 1..];
        let digits_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits_len == 0 || !rest[digits_len..].starts_with("h)") {
            return None;
        }
        rest[..digits_len].parse().ok()
    })
}

/// Human-readable time left on a boost.
pub fn format_time_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (expires_at - now).num_seconds();
    if secs <= 0 {
        return "expired".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{minutes}min")
    }
}
