use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use tracing::warn;

use lojinha_economy::phone;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "changeme",
    "secret",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub bot_url: String,
    pub bot_token: Option<String>,
    pub admin_numbers: HashSet<String>,
    pub utc_offset: FixedOffset,
    pub cleanup_interval_secs: u64,
    pub log_auth_codes: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let jwt_secret = var("LOJINHA_JWT_SECRET", "");
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("LOJINHA_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let port: u16 = var("LOJINHA_PORT", "3000")
            .parse()
            .context("LOJINHA_PORT must be a port number")?;

        let offset_hours: i32 = var("LOJINHA_UTC_OFFSET_HOURS", "-3")
            .parse()
            .context("LOJINHA_UTC_OFFSET_HOURS must be a whole number of hours")?;
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600)
            .context("LOJINHA_UTC_OFFSET_HOURS is out of range")?;

        let cleanup_interval_secs: u64 = var("LOJINHA_CLEANUP_INTERVAL_SECS", "600")
            .parse()
            .context("LOJINHA_CLEANUP_INTERVAL_SECS must be a number of seconds")?;
        if cleanup_interval_secs == 0 {
            bail!("LOJINHA_CLEANUP_INTERVAL_SECS must be greater than zero");
        }

        let bot_token = Some(var("LOJINHA_BOT_TOKEN", "")).filter(|t| !t.is_empty());

        Ok(Self {
            host: var("LOJINHA_HOST", "0.0.0.0"),
            port,
            db_path: var("LOJINHA_DB_PATH", "lojinha.db").into(),
            jwt_secret,
            bot_url: var("LOJINHA_BOT_URL", "http://localhost:3001"),
            bot_token,
            admin_numbers: parse_admin_numbers(&var("LOJINHA_ADMIN_NUMBERS", "")),
            utc_offset,
            cleanup_interval_secs,
            log_auth_codes: matches!(
                var("LOJINHA_LOG_AUTH_CODES", "false").to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
        })
    }
}

fn parse_admin_numbers(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .filter_map(|n| match phone::normalize_number(n) {
            Ok(number) => Some(number),
            Err(e) => {
                warn!("Ignoring admin number: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("LOJINHA_JWT_SECRET", "a-real-secret")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.db_path, PathBuf::from("lojinha.db"));
        assert_eq!(cfg.bot_url, "http://localhost:3001");
        assert_eq!(cfg.bot_token, None);
        assert_eq!(cfg.utc_offset, FixedOffset::west_opt(3 * 3600).unwrap());
        assert_eq!(cfg.cleanup_interval_secs, 600);
        assert!(!cfg.log_auth_codes);
        assert!(cfg.admin_numbers.is_empty());
    }

    #[test]
    fn placeholder_secret_is_rejected() {
        assert!(config(&[]).is_err());
        assert!(config(&[("LOJINHA_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn admin_numbers_are_normalized() {
        let cfg = config(&[
            ("LOJINHA_JWT_SECRET", "a-real-secret"),
            ("LOJINHA_ADMIN_NUMBERS", "11 98765-4321, +55 21 99999-0000,,12"),
            ("LOJINHA_BOT_TOKEN", "tok"),
            ("LOJINHA_LOG_AUTH_CODES", "TRUE"),
        ])
        .unwrap();

        assert_eq!(cfg.admin_numbers.len(), 2);
        assert!(cfg.admin_numbers.contains("5511987654321"));
        assert!(cfg.admin_numbers.contains("5521999990000"));
        assert_eq!(cfg.bot_token.as_deref(), Some("tok"));
        assert!(cfg.log_auth_codes);
    }

    #[test]
    fn bad_numbers_fail_loudly() {
        assert!(config(&[("LOJINHA_JWT_SECRET", "s3cr3t-value"), ("LOJINHA_PORT", "http")]).is_err());
        assert!(config(&[("LOJINHA_JWT_SECRET", "s3cr3t-value"), ("LOJINHA_UTC_OFFSET_HOURS", "99")]).is_err());
    }
}
