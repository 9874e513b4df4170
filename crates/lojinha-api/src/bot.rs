//! Receivers for the WhatsApp bot process. Mounted behind `require_bot_token`.
//!
//! Replies carry ready-to-send WhatsApp text so the bot stays a thin relay.

use axum::{extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use lojinha_db::{db_time, parse_db_time};
use lojinha_db::models::{ActiveBoostRow, UserRow};
use lojinha_db::queries::{effects, users};
use lojinha_economy::daily::{self, DailyOutcome};
use lojinha_economy::{boosts, leveling, milestones, phone};
use lojinha_types::api::{ActivationResponse, BotNumberRequest, BotTextResponse};
use lojinha_types::models::RankingSort;

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::{AppState, blocking, convert, inventory, rewards};

const DEFAULT_COIN_RANKING: u32 = 10;
const MAX_COIN_RANKING: u32 = 50;

/// Registered, non-banned user for a raw number from the bot.
fn registered_user(state: &AppState, raw_number: &str) -> Result<UserRow, ApiError> {
    let number = phone::normalize_number(raw_number)?;
    let user = state
        .db
        .with_conn(|conn| users::get_by_number(conn, &number))?
        .ok_or_else(|| ApiError::not_found("user not registered"))?;
    if user.is_banned {
        return Err(ApiError::forbidden("this account is banned"));
    }
    Ok(user)
}

pub async fn message(
    State(state): State<AppState>,
    Json(req): Json<BotNumberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let number = phone::normalize_number(&req.whatsapp_number)?;
    let reward = blocking(move || {
        let mut rng = rand::rng();
        rewards::apply_message_reward(&state.db, &state.cooldowns, &number, Utc::now(), &mut rng)
    })
    .await?;
    Ok(Json(reward))
}

pub async fn daily(
    State(state): State<AppState>,
    Json(req): Json<BotNumberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reward = blocking(move || {
        let user = registered_user(&state, &req.whatsapp_number)?;
        rewards::claim_daily(&state.db, &user.id, Utc::now(), state.settings.utc_offset)
    })
    .await?;
    Ok(Json(reward))
}

pub async fn coins(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let offset = state.settings.utc_offset;
    let (user, outcome) = blocking(move || {
        let user = registered_user(&state, &number)?;
        let last_claim = user.last_daily_claim.as_deref().map(parse_db_time).transpose()?;
        let outcome = daily::evaluate(last_claim, user.daily_streak, now, offset);
        Ok((user, outcome))
    })
    .await?;
    Ok(Json(BotTextResponse {
        message: render_coins(&user, &outcome),
    }))
}

/// Boosts waiting in the inventory, for the bot's activation menu.
pub async fn inventory_boosts(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stored = blocking(move || {
        let user = registered_user(&state, &number)?;
        inventory::stored_boosts(&state.db, &user.id)
    })
    .await?;
    Ok(Json(stored))
}

pub async fn emojis(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let emojis = blocking(move || {
        let user = registered_user(&state, &number)?;
        inventory::owned_emojis(&state.db, &user.id)
    })
    .await?;
    Ok(Json(emojis))
}

#[derive(Debug, Deserialize)]
pub struct MilestoneQuery {
    #[serde(default)]
    pub level: i64,
}

pub async fn milestone_list(Query(query): Query<MilestoneQuery>) -> impl IntoResponse {
    Json(BotTextResponse {
        message: milestones::render_list(query.level),
    })
}

#[derive(Debug, Deserialize)]
pub struct CoinRankingQuery {
    pub limit: Option<u32>,
}

pub async fn coin_ranking(
    State(state): State<AppState>,
    Query(query): Query<CoinRankingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_COIN_RANKING)
        .clamp(1, MAX_COIN_RANKING);
    let rows = blocking(move || {
        Ok(state
            .db
            .with_conn(|conn| users::ranking(conn, RankingSort::Coins, limit))?)
    })
    .await?;
    Ok(Json(BotTextResponse {
        message: render_coin_ranking(&rows),
    }))
}

pub async fn active_boosts(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let rows = blocking(move || {
        let user = registered_user(&state, &number)?;
        Ok(state
            .db
            .with_conn(|conn| effects::active_boosts(conn, &user.id, &db_time(now)))?)
    })
    .await?;
    Ok(Json(BotTextResponse {
        message: render_boosts(&rows, now)?,
    }))
}

pub async fn activate_boost(
    State(state): State<AppState>,
    Path((number, product_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let activation = blocking(move || {
        let user = registered_user(&state, &number)?;
        rewards::activate_item(&state.db, &user.id, &product_id.to_string(), now, true)
    })
    .await?;

    let message = match activation {
        ActivationResponse::Boost { multiplier, expires_at } => format!(
            "⚡ *BOOST ACTIVATED*\n\n{multiplier}x XP for {}",
            boosts::format_time_remaining(expires_at, now)
        ),
        ActivationResponse::Emoji { .. } => {
            return Err(ApiError::unprocessable("this item is not a boost"));
        }
    };
    Ok(Json(BotTextResponse { message }))
}

fn render_coins(user: &UserRow, daily: &DailyOutcome) -> String {
    let days = if user.daily_streak == 1 { "day" } else { "days" };
    let mut message = format!(
        "💰 *YOUR COINS*\n\n💵 Balance: {} coins\n⭐ Level {} ({}/{} XP)\n🔥 Daily streak: {} {days}",
        user.coins,
        user.level,
        user.xp,
        leveling::xp_for_next_level(user.level),
        user.daily_streak,
    );
    match daily {
        DailyOutcome::Claimable(_) => message.push_str("\n\n✅ Daily reward available! Use !daily"),
        DailyOutcome::AlreadyClaimed { hours_left, .. } => {
            message.push_str(&format!("\n\n⏰ Next !daily in ~{hours_left}h"))
        }
    }
    if let Some(next) = milestones::next_after(user.level) {
        message.push_str(&format!(
            "\n🏆 Next milestone: level {} (+{} coins)",
            next.level, next.coins
        ));
    }
    message
}

fn render_coin_ranking(rows: &[UserRow]) -> String {
    if rows.is_empty() {
        return "🏆 *COIN RANKING*\n\nNobody has coins yet.".to_string();
    }
    let mut message = String::from("🏆 *COIN RANKING*\n");
    for (i, user) in rows.iter().enumerate() {
        let place = match i {
            0 => "🥇".to_string(),
            1 => "🥈".to_string(),
            2 => "🥉".to_string(),
            n => format!("{}.", n + 1),
        };
        message.push_str(&format!("\n{place} {}: {} coins", user.name, user.coins));
    }
    message
}

fn render_boosts(rows: &[ActiveBoostRow], now: DateTime<Utc>) -> anyhow::Result<String> {
    if rows.is_empty() {
        return Ok("⚡ You have no active boosts.".to_string());
    }
    let mut message = String::from("⚡ *ACTIVE BOOSTS*\n");
    for row in rows {
        let expires_at = convert::time(&row.expires_at)?;
        message.push_str(&format!(
            "\n• {}x XP, {} left",
            row.multiplier,
            boosts::format_time_remaining(expires_at, now)
        ));
    }
    Ok(message)
}
