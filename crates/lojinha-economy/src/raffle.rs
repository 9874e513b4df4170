//! Weighted raffle draws.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub user_id: Uuid,
    pub entries_count: i64,
}

/// Pick a winner with probability proportional to each user's entries.
///
/// Every entry becomes one slot in a flat pool and one slot is chosen
/// uniformly. Returns `None` when nobody holds a ticket.
pub fn draw_winner<R: Rng + ?Sized>(tickets: &[Ticket], rng: &mut R) -> Option<Uuid> {
    let pool: Vec<Uuid> = tickets
        .iter()
        .flat_map(|t| std::iter::repeat_n(t.user_id, t.entries_count.max(0) as usize))
        .collect();

    pool.choose(rng).copied()
}

/// Entries are accepted while the raffle is active and before `ends_at`.
pub fn is_open(status_active: bool, ends_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    status_active && ends_at > now
}

/// A winner may be drawn once the raffle has ended and none was drawn yet.
pub fn can_draw(
    status_ended: bool,
    ends_at: DateTime<Utc>,
    has_winner: bool,
    now: DateTime<Utc>,
) -> bool {
    (status_ended || ends_at <= now) && !has_winner
}

pub fn render_result(title: &str, winner_name: &str) -> String {
    format!("🎉 *RAFFLE RESULT* 🎉\n\n🎁 *{title}*\n\n🏆 *Winner:* {winner_name}\n\nCongratulations! 🥳")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_pool_has_no_winner() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(draw_winner(&[], &mut rng), None);

        let zero = [Ticket { user_id: Uuid::new_v4(), entries_count: 0 }];
        assert_eq!(draw_winner(&zero, &mut rng), None);
    }

    #[test]
    fn single_holder_always_wins() {
        let mut rng = StdRng::seed_from_u64(42);
        let holder = Uuid::new_v4();
        let tickets = [
            Ticket { user_id: holder, entries_count: 3 },
            Ticket { user_id: Uuid::new_v4(), entries_count: 0 },
        ];
        for _ in 0..20 {
            assert_eq!(draw_winner(&tickets, &mut rng), Some(holder));
        }
    }

    #[test]
    fn more_entries_win_more_often() {
        let mut rng = StdRng::seed_from_u64(2026);
        let light = Uuid::new_v4();
        let heavy = Uuid::new_v4();
        let tickets = [
            Ticket { user_id: light, entries_count: 1 },
            Ticket { user_id: heavy, entries_count: 3 },
        ];

        let draws = 4000;
        let heavy_wins = (0..draws)
            .filter(|_| draw_winner(&tickets, &mut rng) == Some(heavy))
            .count();

        // Expected 75%; allow a generous band.
        assert!((2800..3200).contains(&heavy_wins), "heavy won {heavy_wins}/{draws}");
    }

    #[test]
    fn draw_window() {
        let now: DateTime<Utc> = "2026-03-10T12:00:00Z".parse().unwrap();
        let past = now - Duration::hours(1);
        let future = now + Duration::hours(1);

        assert!(can_draw(false, past, false, now));
        assert!(can_draw(true, future, false, now));
        assert!(!can_draw(false, future, false, now));
        assert!(!can_draw(true, past, true, now));

        assert!(is_open(true, future, now));
        assert!(!is_open(true, past, now));
        assert!(!is_open(false, future, now));
    }
}
