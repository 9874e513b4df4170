use axum::{Extension, extract::State, response::IntoResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use lojinha_db::db_time;
use lojinha_db::models::NewTransaction;
use lojinha_db::queries::ledger;
use lojinha_db::queries::{store, users};
use lojinha_types::api::PurchaseResponse;
use lojinha_types::models::{ProductCategory, TransactionKind};

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::{AppState, blocking, convert};

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<ProductCategory>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = query.category.map(|c| c.as_str());
    let rows = blocking(move || Ok(state.db.with_conn(|conn| store::list_active(conn, category))?)).await?;
    Ok(Json(convert::all(rows, convert::product)?))
}

/// Buy one unit: all checks, the debit, the item and the ledger row commit
/// together or not at all.
pub async fn buy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let pid = product_id.to_string();

    let (price, balance) = blocking(move || {
        let now = db_time(Utc::now());
        state.db.transaction(|tx| {
            let product = store::get_product(tx, &pid)?
                .filter(|p| p.is_active)
                .ok_or_else(|| ApiError::not_found("product not available"))?;

            if store::find_item(tx, &user_id, &pid)?.is_some() {
                return Err(ApiError::conflict("you already own this item"));
            }
            if !store::take_stock(tx, &pid, &now)? {
                return Err(ApiError::conflict("out of stock"));
            }

            let balance = users::add_coins(tx, &user_id, -product.price, &now)?
                .ok_or_else(|| ApiError::unprocessable("not enough coins"))?;

            store::insert_item(tx, &Uuid::new_v4().to_string(), &user_id, &pid, &now)?;
            ledger::insert_transaction(
                tx,
                &NewTransaction {
                    id: &Uuid::new_v4().to_string(),
                    user_id: &user_id,
                    amount: -product.price,
                    kind: TransactionKind::Purchase.as_str(),
                    description: Some(&format!("Purchased {}", product.name)),
                    reference_id: Some(&pid),
                    created_at: &now,
                },
            )?;

            info!("User {} bought {} for {}", user_id, pid, product.price);
            Ok((product.price, balance))
        })
    })
    .await?;

    Ok(Json(PurchaseResponse {
        product_id,
        price,
        balance,
    }))
}
