use axum::{Extension, extract::State, response::IntoResponse};
use chrono::Utc;

use lojinha_db::db_time;
use lojinha_db::queries::{effects, ledger, store, users};
use lojinha_economy::{boosts, profile};
use lojinha_types::api::{ActiveBoostResponse, UpdateProfileRequest};

use crate::error::ApiError;
use crate::extract::Json;
use crate::middleware::AuthUser;
use crate::{AppState, blocking, convert, inventory, rewards};

const TRANSACTION_HISTORY_LIMIT: u32 = 50;

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let user = blocking(move || Ok(state.db.with_conn(|conn| users::get_by_id(conn, &user_id))?))
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    Ok(Json(convert::user_profile(user)?))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.as_deref().map(profile::validate_name).transpose()?;
    let avatar_url = req
        .avatar_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    let user_id = auth.user_id.to_string();
    let user = blocking(move || {
        let now = db_time(Utc::now());
        Ok(state.db.with_conn(|conn| {
            users::update_profile(conn, &user_id, name.as_deref(), avatar_url.as_deref(), &now)?;
            users::get_by_id(conn, &user_id)
        })?)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(convert::user_profile(user)?))
}

pub async fn my_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let items = blocking(move || Ok(state.db.with_conn(|conn| store::list_items(conn, &user_id))?)).await?;
    Ok(Json(convert::all(items, convert::owned_item)?))
}

pub async fn my_badges(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let badges = blocking(move || Ok(state.db.with_conn(|conn| ledger::list_badges(conn, &user_id))?)).await?;
    Ok(Json(convert::all(badges, convert::badge)?))
}

pub async fn my_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let rows = blocking(move || {
        Ok(state
            .db
            .with_conn(|conn| ledger::list_transactions(conn, &user_id, TRANSACTION_HISTORY_LIMIT))?)
    })
    .await?;
    Ok(Json(convert::all(rows, convert::transaction)?))
}

pub async fn my_boosts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let now = Utc::now();
    let rows = blocking(move || {
        Ok(state
            .db
            .with_conn(|conn| effects::active_boosts(conn, &user_id, &db_time(now)))?)
    })
    .await?;

    let active = rows
        .into_iter()
        .map(|row| {
            let expires_at = convert::time(&row.expires_at)?;
            Ok(ActiveBoostResponse {
                id: convert::id(&row.id)?,
                product_id: convert::id(&row.product_id)?,
                multiplier: row.multiplier,
                expires_at,
                time_remaining: boosts::format_time_remaining(expires_at, now),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(active))
}

/// Owned emoji items with whether each is the active reaction.
pub async fn my_emojis(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let emojis = blocking(move || inventory::owned_emojis(&state.db, &user_id)).await?;
    Ok(Json(emojis))
}

pub async fn claim_daily(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let reward = blocking(move || {
        rewards::claim_daily(&state.db, &user_id, Utc::now(), state.settings.utc_offset)
    })
    .await?;
    Ok(Json(reward))
}
