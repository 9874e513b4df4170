use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;

use lojinha_db::queries::users;
use lojinha_types::models::RankingSort;

use crate::error::ApiError;
use crate::extract::{Json, Query};
use crate::{AppState, blocking, convert};

const RANKING_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    #[serde(default)]
    pub sort: RankingSort,
}

pub async fn ranking(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(move || {
        Ok(state
            .db
            .with_conn(|conn| users::ranking(conn, query.sort, RANKING_SIZE))?)
    })
    .await?;

    let entries = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| convert::ranking_entry(i + 1, row))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(entries))
}
