//! One-time coin bonuses for reaching level thresholds.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub level: i64,
    pub coins: i64,
}

/// Sorted by level.
pub const MILESTONES: &[Milestone] = &[
    Milestone { level: 5, coins: 100 },
    Milestone { level: 10, coins: 250 },
    Milestone { level: 15, coins: 400 },
    Milestone { level: 20, coins: 600 },
    Milestone { level: 25, coins: 850 },
    Milestone { level: 30, coins: 1100 },
    Milestone { level: 40, coins: 1500 },
    Milestone { level: 50, coins: 2000 },
    Milestone { level: 75, coins: 3500 },
    Milestone { level: 100, coins: 5000 },
];

/// The highest milestone passed when moving from `old_level` to `new_level`.
/// Jumping over several thresholds pays only the highest one.
pub fn crossed(old_level: i64, new_level: i64) -> Option<Milestone> {
    if new_level <= old_level {
        return None;
    }
    MILESTONES
        .iter()
        .rev()
        .find(|m| old_level < m.level && new_level >= m.level)
        .copied()
}

pub fn next_after(level: i64) -> Option<Milestone> {
    MILESTONES.iter().find(|m| m.level > level).copied()
}

pub fn render_list(current_level: i64) -> String {
    let mut message = String::from("🏆 *LEVEL MILESTONES*\n\nReach these levels to earn a bonus:\n\n");
    for m in MILESTONES {
        let icon = if current_level >= m.level { "✅" } else { "⬜" };
        message.push_str(&format!("{icon} Level {}: +{} coins\n", m.level, m.coins));
    }
    message
}
