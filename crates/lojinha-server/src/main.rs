mod cleanup;
mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use lojinha_api::bot_client::BotClient;
use lojinha_api::{AppState, AppStateInner, Settings};
use lojinha_db::Database;
use lojinha_economy::messages::MessageCooldowns;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lojinha=debug,lojinha_api=debug,lojinha_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;

    let bot = BotClient::new(&config.bot_url)?;
    info!("Bot process at {}", bot.base_url());
    if config.bot_token.is_none() {
        warn!("LOJINHA_BOT_TOKEN is not set; /bot routes will reject every request");
    }
    if config.log_auth_codes {
        warn!("LOJINHA_LOG_AUTH_CODES is on; undelivered login codes will be logged");
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        bot,
        settings: Settings {
            bot_token: config.bot_token.clone(),
            admin_numbers: config.admin_numbers.clone(),
            utc_offset: config.utc_offset,
            log_auth_codes: config.log_auth_codes,
        },
        cooldowns: MessageCooldowns::new(),
    });

    tokio::spawn(cleanup::run_cleanup_loop(state.clone(), config.cleanup_interval_secs));

    let app = lojinha_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Lojinha listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl+C handler failed: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler failed: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
