use axum::{Extension, extract::State, response::IntoResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use lojinha_db::db_time;
use lojinha_db::models::NewTransaction;
use lojinha_db::queries::ledger;
use lojinha_db::queries::{raffles, users};
use lojinha_economy::raffle;
use lojinha_types::api::EnterRaffleResponse;
use lojinha_types::models::{RaffleStatus, TransactionKind};

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::{AppState, blocking, convert};

#[derive(Debug, Deserialize)]
pub struct RaffleQuery {
    pub status: Option<RaffleStatus>,
}

pub async fn list_raffles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<RaffleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = auth.user_id.to_string();
    let status = query.status.map(|s| s.as_str());
    let rows = blocking(move || {
        Ok(state
            .db
            .with_conn(|conn| raffles::list(conn, status, Some(&viewer)))?)
    })
    .await?;
    Ok(Json(convert::all(rows, convert::raffle)?))
}

pub async fn enter(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(raffle_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let rid = raffle_id.to_string();

    let (my_entries, balance) = blocking(move || {
        let now = Utc::now();
        let stamp = db_time(now);
        state.db.transaction(|tx| {
            let r = raffles::get(tx, &rid)?.ok_or_else(|| ApiError::not_found("raffle not found"))?;
            let ends_at = convert::time(&r.ends_at)?;
            let active = RaffleStatus::parse(&r.status) == Some(RaffleStatus::Active);
            if !raffle::is_open(active, ends_at, now) {
                return Err(ApiError::unprocessable("this raffle is closed"));
            }

            if let Some(max) = r.max_entries_per_user {
                if raffles::user_entries(tx, &rid, &user_id)? >= max {
                    return Err(ApiError::conflict("entry limit reached"));
                }
            }

            let balance = if r.entry_cost > 0 {
                let balance = users::add_coins(tx, &user_id, -r.entry_cost, &stamp)?
                    .ok_or_else(|| ApiError::unprocessable("not enough coins"))?;
                ledger::insert_transaction(
                    tx,
                    &NewTransaction {
                        id: &Uuid::new_v4().to_string(),
                        user_id: &user_id,
                        amount: -r.entry_cost,
                        kind: TransactionKind::RaffleEntry.as_str(),
                        description: Some(&format!("Raffle entry: {}", r.title)),
                        reference_id: Some(&rid),
                        created_at: &stamp,
                    },
                )?;
                balance
            } else {
                users::get_by_id(tx, &user_id)?
                    .map(|u| u.coins)
                    .ok_or_else(|| ApiError::not_found("user not found"))?
            };

            let my_entries = raffles::add_entry(tx, &Uuid::new_v4().to_string(), &rid, &user_id, &stamp)?;
            Ok((my_entries, balance))
        })
    })
    .await?;

    Ok(Json(EnterRaffleResponse {
        raffle_id,
        my_entries,
        balance,
    }))
}
