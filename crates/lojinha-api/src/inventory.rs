use std::collections::HashMap;

use axum::{Extension, extract::State, response::IntoResponse};
use chrono::Utc;
use uuid::Uuid;

use lojinha_db::Database;
use lojinha_db::models::OwnedItemRow;
use lojinha_db::queries::{effects, store};
use lojinha_economy::{boosts, emoji};
use lojinha_types::api::{InventoryBoostResponse, OwnedEmojiResponse};
use lojinha_types::models::ProductCategory;

use crate::error::ApiError;
use crate::extract::{Json, Path};
use crate::middleware::AuthUser;
use crate::{AppState, blocking, convert, rewards};

/// `POST /me/items/{product_id}/activate`: consume a boost or toggle an emoji.
pub async fn activate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id.to_string();
    let activation = blocking(move || {
        rewards::activate_item(&state.db, &user_id, &product_id.to_string(), Utc::now(), false)
    })
    .await?;
    Ok(Json(activation))
}

fn in_category(item: &OwnedItemRow, category: ProductCategory) -> bool {
    ProductCategory::parse(&item.product.category) == Some(category)
}

/// Owned reaction emojis with their on/off state.
pub(crate) fn owned_emojis(db: &Database, user_id: &str) -> Result<Vec<OwnedEmojiResponse>, ApiError> {
    let (items, states) = db.with_conn(|conn| {
        Ok((store::list_items(conn, user_id)?, effects::emoji_states(conn, user_id)?))
    })?;

    let active: HashMap<String, bool> = states
        .into_iter()
        .map(|s| (s.product_id, s.is_active))
        .collect();

    let mut emojis = Vec::new();
    for item in items {
        if !in_category(&item, ProductCategory::Emoji) {
            continue;
        }
        let product = item.product;
        emojis.push(OwnedEmojiResponse {
            product_id: convert::id(&product.id)?,
            emoji: emoji::extract_reaction_emoji(&product.name),
            is_active: active.get(&product.id).copied().unwrap_or(false),
            name: product.name,
        });
    }
    Ok(emojis)
}

/// Boosts bought but not activated yet. Activation consumes the item, so
/// these are exactly the boosts left in the inventory.
pub(crate) fn stored_boosts(
    db: &Database,
    user_id: &str,
) -> Result<Vec<InventoryBoostResponse>, ApiError> {
    let items = db.with_conn(|conn| store::list_items(conn, user_id))?;

    let mut stored = Vec::new();
    for item in items {
        if !in_category(&item, ProductCategory::Boost) {
            continue;
        }
        let product = item.product;
        let spec = boosts::parse_boost_name(&product.name);
        stored.push(InventoryBoostResponse {
            product_id: convert::id(&product.id)?,
            name: product.name,
            description: product.description,
            multiplier: spec.multiplier,
            duration_hours: spec.duration_hours,
        });
    }
    Ok(stored)
}
