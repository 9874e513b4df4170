//! Admin-only routes. Mounted behind `require_auth` + `require_admin`.

use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use lojinha_db::db_time;
use lojinha_db::models::{NewProduct, NewRaffle, NewTransaction};
use lojinha_db::queries::ledger;
use lojinha_db::queries::{raffles, store, users};
use lojinha_economy::{phone, raffle};
use lojinha_types::api::{
    AdjustCoinsRequest, AdjustCoinsResponse, BanResponse, CreateProductRequest,
    CreateRaffleRequest, DrawResponse,
};
use lojinha_types::models::{RaffleStatus, TransactionKind};

use crate::error::ApiError;
use crate::extract::{Json, Path};
use crate::middleware::AuthUser;
use crate::{AppState, blocking, convert};

// -- Users --

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(move || Ok(state.db.with_conn(users::list_all)?)).await?;
    Ok(Json(convert::all(rows, convert::user_profile)?))
}

/// Credit or debit coins. A debit that would leave a negative balance is refused.
pub async fn adjust_coins(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AdjustCoinsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let amount = req.amount;
    if amount == 0 {
        return Err(ApiError::bad_request("amount must not be zero"));
    }

    let uid = user_id.to_string();
    let admin_id = admin.user_id.to_string();
    let balance = blocking(move || {
        let now = db_time(Utc::now());
        state.db.transaction(|tx| {
            if users::get_by_id(tx, &uid)?.is_none() {
                return Err(ApiError::not_found("user not found"));
            }
            let balance = users::add_coins(tx, &uid, amount, &now)?
                .ok_or_else(|| ApiError::unprocessable("balance cannot go negative"))?;
            ledger::insert_transaction(
                tx,
                &NewTransaction {
                    id: &Uuid::new_v4().to_string(),
                    user_id: &uid,
                    amount,
                    kind: TransactionKind::Admin.as_str(),
                    description: Some("Admin adjustment"),
                    reference_id: Some(&admin_id),
                    created_at: &now,
                },
            )?;
            Ok(balance)
        })
    })
    .await?;

    info!("Admin {} adjusted {} by {}", admin.user_id, user_id, amount);
    Ok(Json(AdjustCoinsResponse { user_id, balance }))
}

pub async fn toggle_ban(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if user_id == admin.user_id {
        return Err(ApiError::bad_request("you cannot ban yourself"));
    }
    let uid = user_id.to_string();
    let is_banned = blocking(move || {
        let now = db_time(Utc::now());
        Ok(state.db.with_conn(|conn| users::toggle_ban(conn, &uid, &now))?)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("user not found"))?;

    info!("User {} banned={}", user_id, is_banned);
    Ok(Json(BanResponse { user_id, is_banned }))
}

// -- Products --

pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(move || Ok(state.db.with_conn(store::list_all)?)).await?;
    Ok(Json(convert::all(rows, convert::product)?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if req.price < 0 {
        return Err(ApiError::bad_request("price must not be negative"));
    }
    let stock = if req.is_limited {
        match req.stock {
            Some(n) if n >= 0 => Some(n),
            _ => return Err(ApiError::bad_request("limited products need a non-negative stock")),
        }
    } else {
        None
    };

    let id = Uuid::new_v4().to_string();
    let row = blocking(move || {
        let now = db_time(Utc::now());
        Ok(state.db.with_conn(|conn| {
            store::insert_product(
                conn,
                &NewProduct {
                    id: &id,
                    name: &name,
                    description: req.description.as_deref(),
                    category: req.category.as_str(),
                    price: req.price,
                    image_url: req.image_url.as_deref(),
                    rarity: &req.rarity,
                    is_limited: req.is_limited,
                    stock,
                    created_at: &now,
                },
            )?;
            store::get_product(conn, &id)
        })?)
    })
    .await?
    .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("product missing after insert")))?;

    info!("Product {} created", row.id);
    Ok((StatusCode::CREATED, Json(convert::product(row)?)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pid = product_id.to_string();
    let deleted = blocking(move || Ok(state.db.with_conn(|conn| store::delete_product(conn, &pid))?)).await?;
    if !deleted {
        return Err(ApiError::not_found("product not found"));
    }
    info!("Product {} deleted", product_id);
    Ok(StatusCode::NO_CONTENT)
}

// -- Raffles --

pub async fn list_raffles(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(move || Ok(state.db.with_conn(|conn| raffles::list(conn, None, None))?)).await?;
    Ok(Json(convert::all(rows, convert::raffle)?))
}

pub async fn create_raffle(
    State(state): State<AppState>,
    Json(req): Json<CreateRaffleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = req.title.trim().to_string();
    if title.is_empty() || req.prize_description.trim().is_empty() {
        return Err(ApiError::bad_request("title and prize description are required"));
    }
    if req.entry_cost < 0 {
        return Err(ApiError::bad_request("entry cost must not be negative"));
    }
    if matches!(req.max_entries_per_user, Some(n) if n < 1) {
        return Err(ApiError::bad_request("max entries per user must be at least 1"));
    }
    let now = Utc::now();
    if req.ends_at <= now {
        return Err(ApiError::bad_request("end date must be in the future"));
    }
    let notification_group = req
        .notification_group
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(phone::group_jid);

    let id = Uuid::new_v4().to_string();
    let row = blocking(move || {
        let stamp = db_time(now);
        Ok(state.db.with_conn(|conn| {
            raffles::insert(
                conn,
                &NewRaffle {
                    id: &id,
                    title: &title,
                    description: req.description.as_deref(),
                    prize_description: req.prize_description.trim(),
                    prize_type: req.prize_type.as_str(),
                    prize_image_url: req.prize_image_url.as_deref(),
                    entry_cost: req.entry_cost,
                    max_entries_per_user: req.max_entries_per_user,
                    ends_at: &db_time(req.ends_at),
                    notification_group: notification_group.as_deref(),
                    created_at: &stamp,
                },
            )?;
            Ok(raffles::list(conn, None, None)?
                .into_iter()
                .find(|r| r.raffle.id == id))
        })?)
    })
    .await?
    .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("raffle missing after insert")))?;

    info!("Raffle {} created", row.raffle.id);
    Ok((StatusCode::CREATED, Json(convert::raffle(row)?)))
}

/// Draw the winner of an ended raffle and announce it to the configured group.
pub async fn draw(
    State(state): State<AppState>,
    Path(raffle_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rid = raffle_id.to_string();
    let db = state.clone();

    let (winner_id, winner_name, title, group) = blocking(move || {
        let now = Utc::now();
        db.db.transaction(|tx| {
            let r = raffles::get(tx, &rid)?.ok_or_else(|| ApiError::not_found("raffle not found"))?;
            let status = RaffleStatus::parse(&r.status);
            if status == Some(RaffleStatus::Cancelled) {
                return Err(ApiError::unprocessable("this raffle was cancelled"));
            }
            if r.winner_id.is_some() {
                return Err(ApiError::conflict("a winner was already drawn"));
            }
            let ends_at = convert::time(&r.ends_at)?;
            if !raffle::can_draw(status == Some(RaffleStatus::Ended), ends_at, false, now) {
                return Err(ApiError::unprocessable("this raffle has not ended yet"));
            }

            let tickets = raffles::tickets(tx, &rid)?
                .into_iter()
                .map(|t| {
                    Ok(raffle::Ticket {
                        user_id: convert::id(&t.user_id)?,
                        entries_count: t.entries_count,
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            let winner_id = raffle::draw_winner(&tickets, &mut rand::rng())
                .ok_or_else(|| ApiError::unprocessable("this raffle has no entries"))?;

            if !raffles::set_winner(tx, &rid, &winner_id.to_string())? {
                return Err(ApiError::conflict("a winner was already drawn"));
            }
            let winner = users::get_by_id(tx, &winner_id.to_string())?
                .ok_or_else(|| anyhow::anyhow!("winner {winner_id} has no user row"))?;

            Ok((winner_id, winner.name, r.title, r.notification_group))
        })
    })
    .await?;

    info!("Raffle {} won by {}", raffle_id, winner_id);

    let notified = match group {
        Some(group) => {
            let text = raffle::render_result(&title, &winner_name);
            match state.bot.send_message(&group, &text).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Raffle {} announcement failed: {:#}", raffle_id, e);
                    false
                }
            }
        }
        None => false,
    };

    Ok(Json(DrawResponse {
        raffle_id,
        winner_id,
        winner_name,
        notified,
    }))
}
