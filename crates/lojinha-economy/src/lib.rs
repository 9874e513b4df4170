//! Lojinha economy rules.
//!
//! Pure functions over the numbers stored in the database: daily streaks,
//! level curve and milestone bonuses, message coin rolls, XP boost
//! multipliers and weighted raffle draws. Nothing in here touches the store
//! or the network; callers pass in the current time and a random source.

pub mod boosts;
pub mod daily;
pub mod emoji;
pub mod leveling;
pub mod messages;
pub mod milestones;
pub mod phone;
pub mod profile;
pub mod raffle;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("invalid WhatsApp number: {0:?}")]
    InvalidNumber(String),
    #[error("name must be between 1 and {max} characters")]
    InvalidName { max: usize },
}
