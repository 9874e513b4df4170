//! Level curve and message XP.

const XP_PER_LEVEL: i64 = 100;

/// XP granted for one counted message before boosts.
pub const MESSAGE_XP: i64 = 10;

/// XP needed to leave `level`. `xp` on a user row is progress inside the
/// current level, so it always stays below this.
pub fn xp_for_next_level(level: i64) -> i64 {
    level.max(1) * XP_PER_LEVEL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: i64,
    pub xp: i64,
    pub levels_gained: i64,
}

impl LevelProgress {
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Add `gained` XP and roll any overflow into level-ups.
pub fn apply_xp(level: i64, xp: i64, gained: i64) -> LevelProgress {
    let mut level = level.max(1);
    let mut xp = (xp + gained.max(0)).max(0);
    let mut levels_gained = 0;

    let mut needed = xp_for_next_level(level);
    while xp >= needed {
        xp -= needed;
        level += 1;
        levels_gained += 1;
        needed = xp_for_next_level(level);
    }

    LevelProgress { level, xp, levels_gained }
}

/// Message XP after the active boost multiplier, never below 1.
pub fn message_xp(multiplier: f64) -> i64 {
    let boosted = (MESSAGE_XP as f64 * multiplier).floor() as i64;
    boosted.max(1)
}

pub fn progress_percent(level: i64, xp: i64) -> f64 {
    let pct = xp as f64 / xp_for_next_level(level) as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}
