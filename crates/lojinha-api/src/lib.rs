pub mod admin;
pub mod auth;
pub mod bot;
pub mod bot_client;
mod convert;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod middleware;
pub mod profile;
pub mod raffles;
pub mod ranking;
mod rewards;
pub mod routes;
pub mod store;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::FixedOffset;

use lojinha_db::Database;
use lojinha_economy::messages::MessageCooldowns;

use crate::bot_client::BotClient;
use crate::error::ApiError;

pub use routes::router;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub bot: BotClient,
    pub settings: Settings,
    pub cooldowns: MessageCooldowns,
}

/// Runtime knobs the handlers need, filled from the server config.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Shared secret for `/bot/*`. `None` rejects every bot request.
    pub bot_token: Option<String>,
    /// Normalized numbers promoted to admin when they log in.
    pub admin_numbers: HashSet<String>,
    /// Where calendar days start for daily rewards.
    pub utc_offset: FixedOffset,
    /// Log auth codes that could not be delivered. Development only.
    pub log_auth_codes: bool,
}

/// Run blocking store work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
}
