//! Store rows to API responses.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use lojinha_db::models::{
    BadgeRow, OwnedItemRow, ProductRow, RaffleSummaryRow, TransactionRow, UserRow,
};
use lojinha_db::parse_db_time;
use lojinha_economy::leveling;
use lojinha_types::api::{
    BadgeResponse, OwnedItemResponse, ProductResponse, RaffleResponse, RankingEntry,
    TransactionResponse, UserProfile,
};
use lojinha_types::models::{PrizeType, ProductCategory, RaffleStatus};

pub(crate) fn id(s: &str) -> Result<Uuid> {
    s.parse().with_context(|| format!("bad id in store: {s:?}"))
}

pub(crate) fn time(s: &str) -> Result<DateTime<Utc>> {
    parse_db_time(s).with_context(|| format!("bad timestamp in store: {s:?}"))
}

pub(crate) fn user_profile(row: UserRow) -> Result<UserProfile> {
    Ok(UserProfile {
        id: id(&row.id)?,
        xp_for_next_level: leveling::xp_for_next_level(row.level),
        last_daily_claim: row.last_daily_claim.as_deref().map(time).transpose()?,
        created_at: time(&row.created_at)?,
        updated_at: time(&row.updated_at)?,
        whatsapp_number: row.whatsapp_number,
        name: row.name,
        avatar_url: row.avatar_url,
        level: row.level,
        xp: row.xp,
        prestige: row.prestige,
        coins: row.coins,
        is_admin: row.is_admin,
        is_banned: row.is_banned,
        equipped_avatar: row.equipped_avatar,
        equipped_frame: row.equipped_frame,
        equipped_title: row.equipped_title,
        daily_streak: row.daily_streak,
        total_messages: row.total_messages,
    })
}

pub(crate) fn ranking_entry(rank: usize, row: UserRow) -> Result<RankingEntry> {
    Ok(RankingEntry {
        rank,
        id: id(&row.id)?,
        name: row.name,
        avatar_url: row.avatar_url,
        level: row.level,
        prestige: row.prestige,
        xp: row.xp,
        coins: row.coins,
    })
}

pub(crate) fn product(row: ProductRow) -> Result<ProductResponse> {
    let category = ProductCategory::parse(&row.category)
        .ok_or_else(|| anyhow!("unknown product category {:?}", row.category))?;
    Ok(ProductResponse {
        id: id(&row.id)?,
        created_at: time(&row.created_at)?,
        name: row.name,
        description: row.description,
        category,
        price: row.price,
        image_url: row.image_url,
        rarity: row.rarity,
        is_active: row.is_active,
        is_limited: row.is_limited,
        stock: row.stock,
    })
}

pub(crate) fn owned_item(row: OwnedItemRow) -> Result<OwnedItemResponse> {
    Ok(OwnedItemResponse {
        id: id(&row.id)?,
        purchased_at: time(&row.purchased_at)?,
        product: product(row.product)?,
    })
}

pub(crate) fn transaction(row: TransactionRow) -> Result<TransactionResponse> {
    Ok(TransactionResponse {
        id: id(&row.id)?,
        created_at: time(&row.created_at)?,
        amount: row.amount,
        kind: row.kind,
        description: row.description,
        reference_id: row.reference_id,
    })
}

pub(crate) fn badge(row: BadgeRow) -> Result<BadgeResponse> {
    Ok(BadgeResponse {
        id: id(&row.id)?,
        earned_at: time(&row.earned_at)?,
        badge_name: row.badge_name,
        badge_icon: row.badge_icon,
    })
}

pub(crate) fn raffle(row: RaffleSummaryRow) -> Result<RaffleResponse> {
    let r = row.raffle;
    let prize_type = PrizeType::parse(&r.prize_type)
        .ok_or_else(|| anyhow!("unknown prize type {:?}", r.prize_type))?;
    let status = RaffleStatus::parse(&r.status)
        .ok_or_else(|| anyhow!("unknown raffle status {:?}", r.status))?;
    Ok(RaffleResponse {
        id: id(&r.id)?,
        ends_at: time(&r.ends_at)?,
        created_at: time(&r.created_at)?,
        winner_id: r.winner_id.as_deref().map(id).transpose()?,
        winner_name: row.winner_name,
        total_entries: row.total_entries,
        my_entries: row.my_entries,
        title: r.title,
        description: r.description,
        prize_description: r.prize_description,
        prize_type,
        prize_image_url: r.prize_image_url,
        entry_cost: r.entry_cost,
        max_entries_per_user: r.max_entries_per_user,
        status,
    })
}

/// Collect converted rows, failing on the first bad one.
pub(crate) fn all<R, T>(rows: Vec<R>, f: impl Fn(R) -> Result<T>) -> Result<Vec<T>> {
    rows.into_iter().map(f).collect()
}
