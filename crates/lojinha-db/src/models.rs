/// Database row types: these map directly to SQLite rows.
/// Distinct from lojinha-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub whatsapp_number: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub level: i64,
    pub xp: i64,
    pub prestige: i64,
    pub coins: i64,
    pub is_admin: bool,
    pub is_banned: bool,
    pub equipped_avatar: Option<String>,
    pub equipped_frame: Option<String>,
    pub equipped_title: Option<String>,
    pub daily_streak: i64,
    pub last_daily_claim: Option<String>,
    pub total_messages: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub rarity: String,
    pub is_active: bool,
    pub is_limited: bool,
    pub stock: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewProduct<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub price: i64,
    pub image_url: Option<&'a str>,
    pub rarity: &'a str,
    pub is_limited: bool,
    pub stock: Option<i64>,
    pub created_at: &'a str,
}

/// An owned item joined with its product.
#[derive(Debug, Clone)]
pub struct OwnedItemRow {
    pub id: String,
    pub purchased_at: String,
    pub product: ProductRow,
}

#[derive(Debug, Clone)]
pub struct RaffleRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub prize_description: String,
    pub prize_type: String,
    pub prize_image_url: Option<String>,
    pub entry_cost: i64,
    pub max_entries_per_user: Option<i64>,
    pub status: String,
    pub ends_at: String,
    pub winner_id: Option<String>,
    pub notification_group: Option<String>,
    pub created_at: String,
}

pub struct NewRaffle<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub prize_description: &'a str,
    pub prize_type: &'a str,
    pub prize_image_url: Option<&'a str>,
    pub entry_cost: i64,
    pub max_entries_per_user: Option<i64>,
    pub ends_at: &'a str,
    pub notification_group: Option<&'a str>,
    pub created_at: &'a str,
}

/// A raffle with its entry totals, as shown in listings.
#[derive(Debug, Clone)]
pub struct RaffleSummaryRow {
    pub raffle: RaffleRow,
    pub winner_name: Option<String>,
    pub total_entries: i64,
    pub my_entries: i64,
}

#[derive(Debug, Clone)]
pub struct TicketRow {
    pub user_id: String,
    pub entries_count: i64,
}

/// One ledger row to append. `kind` is a `TransactionKind` string.
pub struct NewTransaction<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub amount: i64,
    pub kind: &'a str,
    pub description: Option<&'a str>,
    pub reference_id: Option<&'a str>,
    pub created_at: &'a str,
}

#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub kind: String,
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct BadgeRow {
    pub id: String,
    pub badge_name: String,
    pub badge_icon: String,
    pub earned_at: String,
}

#[derive(Debug, Clone)]
pub struct ActiveBoostRow {
    pub id: String,
    pub product_id: String,
    pub multiplier: f64,
    pub expires_at: String,
}

#[derive(Debug, Clone)]
pub struct EmojiStateRow {
    pub product_id: String,
    pub emoji: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct SessionRow {
    pub id: String,
    pub user_id: String,
    pub expires_at: String,
}
