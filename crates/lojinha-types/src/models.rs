use serde::{Deserialize, Serialize};

/// Shop catalogue categories. `emoji` and `boost` are the activatable ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Avatar,
    Badge,
    Frame,
    Title,
    Emoji,
    Boost,
    Special,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Badge => "badge",
            Self::Frame => "frame",
            Self::Title => "title",
            Self::Emoji => "emoji",
            Self::Boost => "boost",
            Self::Special => "special",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "avatar" => Self::Avatar,
            "badge" => Self::Badge,
            "frame" => Self::Frame,
            "title" => Self::Title,
            "emoji" => Self::Emoji,
            "boost" => Self::Boost,
            "special" => Self::Special,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaffleStatus {
    Active,
    Ended,
    Cancelled,
}

impl RaffleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "active" => Self::Active,
            "ended" => Self::Ended,
            "cancelled" => Self::Cancelled,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrizeType {
    Virtual,
    Real,
    Mixed,
}

impl PrizeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Virtual => "virtual",
            Self::Real => "real",
            Self::Mixed => "mixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "virtual" => Self::Virtual,
            "real" => Self::Real,
            "mixed" => Self::Mixed,
            _ => return None,
        })
    }
}

/// Ledger entry kinds. Stored verbatim in `transactions.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
    RaffleEntry,
    DailyReward,
    MessageEarn,
    MilestoneBonus,
    Admin,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::RaffleEntry => "raffle_entry",
            Self::DailyReward => "daily_reward",
            Self::MessageEarn => "message_earn",
            Self::MilestoneBonus => "milestone_bonus",
            Self::Admin => "admin",
        }
    }
}

/// Ranking orderings offered by `GET /ranking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingSort {
    #[default]
    Level,
    Xp,
    Coins,
}
