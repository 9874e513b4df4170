use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{PrizeType, ProductCategory, RaffleStatus};

// -- JWT Claims --

/// Session-bound JWT claims. `sid` points at a `user_sessions` row; deleting
/// that row revokes the token even before `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub sid: Uuid,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestCodeRequest {
    pub whatsapp_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestCodeResponse {
    /// False when the bot could not be reached. The code stays valid.
    pub sent: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub whatsapp_number: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub whatsapp_number: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub level: i64,
    pub xp: i64,
    pub xp_for_next_level: i64,
    pub prestige: i64,
    pub coins: i64,
    pub is_admin: bool,
    pub is_banned: bool,
    pub equipped_avatar: Option<String>,
    pub equipped_frame: Option<String>,
    pub equipped_title: Option<String>,
    pub daily_streak: i64,
    pub last_daily_claim: Option<DateTime<Utc>>,
    pub total_messages: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BadgeResponse {
    pub id: Uuid,
    pub badge_name: String,
    pub badge_icon: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub level: i64,
    pub prestige: i64,
    pub xp: i64,
    pub coins: i64,
}

// -- Store --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: ProductCategory,
    pub price: i64,
    pub image_url: Option<String>,
    pub rarity: String,
    pub is_active: bool,
    pub is_limited: bool,
    pub stock: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: ProductCategory,
    pub price: i64,
    pub image_url: Option<String>,
    #[serde(default = "default_rarity")]
    pub rarity: String,
    #[serde(default)]
    pub is_limited: bool,
    pub stock: Option<i64>,
}

fn default_rarity() -> String {
    "common".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub product_id: Uuid,
    pub price: i64,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnedItemResponse {
    pub id: Uuid,
    pub purchased_at: DateTime<Utc>,
    pub product: ProductResponse,
}

// -- Boosts & emojis --

#[derive(Debug, Serialize, Deserialize)]
pub struct ActiveBoostResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub multiplier: f64,
    pub expires_at: DateTime<Utc>,
    pub time_remaining: String,
}

/// A boost still in the inventory, with what it will do once activated.
#[derive(Debug, Serialize, Deserialize)]
pub struct InventoryBoostResponse {
    pub product_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub multiplier: f64,
    pub duration_hours: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnedEmojiResponse {
    pub product_id: Uuid,
    pub name: String,
    pub emoji: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivationResponse {
    Boost {
        multiplier: f64,
        expires_at: DateTime<Utc>,
    },
    Emoji {
        emoji: String,
        active: bool,
    },
}

// -- Rewards --

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyRewardResponse {
    pub claimed: bool,
    pub coins: i64,
    pub streak: i64,
    pub streak_bonus: i64,
    pub balance: i64,
    /// Hours until the next claim, set only when already claimed today.
    pub hours_left: Option<i64>,
    pub message: String,
}

// -- Raffles --

#[derive(Debug, Serialize, Deserialize)]
pub struct RaffleResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub prize_description: String,
    pub prize_type: PrizeType,
    pub prize_image_url: Option<String>,
    pub entry_cost: i64,
    pub max_entries_per_user: Option<i64>,
    pub status: RaffleStatus,
    pub ends_at: DateTime<Utc>,
    pub winner_id: Option<Uuid>,
    pub winner_name: Option<String>,
    pub total_entries: i64,
    pub my_entries: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRaffleRequest {
    pub title: String,
    pub description: Option<String>,
    pub prize_description: String,
    pub prize_type: PrizeType,
    pub prize_image_url: Option<String>,
    #[serde(default)]
    pub entry_cost: i64,
    /// `None` means unlimited entries per user.
    pub max_entries_per_user: Option<i64>,
    pub ends_at: DateTime<Utc>,
    pub notification_group: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnterRaffleResponse {
    pub raffle_id: Uuid,
    pub my_entries: i64,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DrawResponse {
    pub raffle_id: Uuid,
    pub winner_id: Uuid,
    pub winner_name: String,
    pub notified: bool,
}

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdjustCoinsRequest {
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdjustCoinsResponse {
    pub user_id: Uuid,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BanResponse {
    pub user_id: Uuid,
    pub is_banned: bool,
}

// -- Bot receivers --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotNumberRequest {
    pub whatsapp_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MilestoneReward {
    pub level: i64,
    pub coins: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRewardResponse {
    pub coins_earned: i64,
    pub balance: i64,
    pub xp_earned: i64,
    pub multiplier: f64,
    pub level: i64,
    pub leveled_up: bool,
    pub milestone: Option<MilestoneReward>,
    /// Emoji the bot should react with, when the sender has one active.
    pub reaction_emoji: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BotTextResponse {
    pub message: String,
}
