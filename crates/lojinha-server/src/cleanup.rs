use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use lojinha_api::AppState;
use lojinha_db::queries::{auth, effects};
use lojinha_db::{Database, db_time};
use lojinha_economy::messages::MessageCooldowns;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub boosts: usize,
    pub auth_codes: usize,
    pub sessions: usize,
    pub cooldowns: usize,
}

impl CleanupReport {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Background task that prunes expired boosts, spent auth codes, expired
/// sessions and stale message cooldowns.
pub async fn run_cleanup_loop(state: AppState, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let state = state.clone();
        let result =
            tokio::task::spawn_blocking(move || cleanup_expired(&state.db, &state.cooldowns, Utc::now()))
                .await;

        match result {
            Ok(Ok(report)) => {
                if !report.is_empty() {
                    info!(
                        "Cleanup: {} boosts, {} auth codes, {} sessions, {} cooldowns",
                        report.boosts, report.auth_codes, report.sessions, report.cooldowns
                    );
                }
            }
            Ok(Err(e)) => warn!("Cleanup error: {:#}", e),
            Err(e) => warn!("Cleanup task failed: {}", e),
        }
    }
}

pub fn cleanup_expired(
    db: &Database,
    cooldowns: &MessageCooldowns,
    now: DateTime<Utc>,
) -> anyhow::Result<CleanupReport> {
    let stamp = db_time(now);
    let (boosts, auth_codes, sessions) = db.with_conn(|conn| {
        Ok((
            effects::delete_expired_boosts(conn, &stamp)?,
            auth::delete_stale_codes(conn, &stamp)?,
            auth::delete_expired_sessions(conn, &stamp)?,
        ))
    })?;

    Ok(CleanupReport {
        boosts,
        auth_codes,
        sessions,
        cooldowns: cooldowns.prune(now),
    })
}
