//! Passive coins for chatting.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const MIN_COINS: i64 = 1;
pub const MAX_COINS: i64 = 3;
pub const EARN_CHANCE: f64 = 0.7;
pub const COOLDOWN_SECS: i64 = 30;

/// Roll the coin reward for one message: 70% chance of 1 to 3 coins.
pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Option<i64> {
    if !rng.random_bool(EARN_CHANCE) {
        return None;
    }
    Some(rng.random_range(MIN_COINS..=MAX_COINS))
}

/// Last successful earn per normalized number.
///
/// Lives in memory only; a restart simply lets everyone earn again.
#[derive(Default)]
pub struct MessageCooldowns {
    last_earn: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MessageCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll coins for `number` unless it earned within the cooldown window.
    /// A failed roll does not start the cooldown.
    pub fn try_earn<R: Rng + ?Sized>(
        &self,
        number: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<i64> {
        let mut last_earn = self.last_earn.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = last_earn.get(number) {
            if now - *previous < Duration::seconds(COOLDOWN_SECS) {
                return None;
            }
        }

        let amount = roll(rng)?;
        last_earn.insert(number.to_string(), now);
        Some(amount)
    }

    /// Undo the cooldown started by a grant at `earned_at` that was never
    /// paid out. A newer grant for the same number is left alone.
    pub fn release(&self, number: &str, earned_at: DateTime<Utc>) {
        let mut last_earn = self.last_earn.lock().unwrap_or_else(PoisonError::into_inner);
        if last_earn.get(number) == Some(&earned_at) {
            last_earn.remove(number);
        }
    }

    /// Drop entries whose cooldown has passed. Returns how many were removed.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut last_earn = self.last_earn.lock().unwrap_or_else(PoisonError::into_inner);
        let before = last_earn.len();
        last_earn.retain(|_, at| now - *at < Duration::seconds(COOLDOWN_SECS));
        before - last_earn.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn rolls_stay_in_range_and_sometimes_miss() {
        let mut rng = StdRng::seed_from_u64(7);
        let rolls: Vec<Option<i64>> = (0..1000).map(|_| roll(&mut rng)).collect();

        assert!(rolls.iter().flatten().all(|c| (MIN_COINS..=MAX_COINS).contains(c)));
        let hits = rolls.iter().filter(|r| r.is_some()).count();
        assert!((600..800).contains(&hits), "hit count {hits} far from 70%");
    }

    #[test]
    fn cooldown_blocks_until_window_passes() {
        let cooldowns = MessageCooldowns::new();
        let mut rng = StdRng::seed_from_u64(1);
        let start = at("2026-03-10T12:00:00Z");

        // Keep trying until the first successful roll.
        let mut earned_at = None;
        for i in 0..50 {
            let now = start + Duration::seconds(i * 31);
            if cooldowns.try_earn("5511987654321", now, &mut rng).is_some() {
                earned_at = Some(now);
                break;
            }
        }
        let earned_at = earned_at.expect("no successful roll in 50 attempts");

        for s in [0, 10, 29] {
            let now = earned_at + Duration::seconds(s);
            assert_eq!(cooldowns.try_earn("5511987654321", now, &mut rng), None);
        }

        // Another number is unaffected by the first one's cooldown.
        let other = (0..50).any(|_| cooldowns.try_earn("5511911112222", earned_at, &mut rng).is_some());
        assert!(other);
    }

    #[test]
    fn release_reopens_only_the_matching_grant() {
        let cooldowns = MessageCooldowns::new();
        let mut rng = StdRng::seed_from_u64(3);
        let start = at("2026-03-10T12:00:00Z");
        while cooldowns.try_earn("a", start, &mut rng).is_none() {}

        // A different timestamp belongs to some other grant.
        cooldowns.release("a", start + Duration::seconds(1));
        assert_eq!(cooldowns.try_earn("a", start + Duration::seconds(2), &mut rng), None);

        cooldowns.release("a", start);
        let reopened = (0..50).any(|_| cooldowns.try_earn("a", start + Duration::seconds(2), &mut rng).is_some());
        assert!(reopened);
    }

    #[test]
    fn prune_removes_stale_entries() {
        let cooldowns = MessageCooldowns::new();
        let mut rng = StdRng::seed_from_u64(3);
        let start = at("2026-03-10T12:00:00Z");
        while cooldowns.try_earn("a", start, &mut rng).is_none() {}

        assert_eq!(cooldowns.prune(start + Duration::seconds(5)), 0);
        assert_eq!(cooldowns.prune(start + Duration::seconds(31)), 1);
    }
}
