//! Coin and XP workflows shared by the web and bot routes.
//!
//! Each function runs one store transaction and must be called from
//! blocking context.

use anyhow::anyhow;
use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;
use uuid::Uuid;

use lojinha_db::models::NewTransaction;
use lojinha_db::queries::ledger;
use lojinha_db::queries::{effects, store, users};
use lojinha_db::{Database, db_time, parse_db_time};
use lojinha_economy::daily::{self, DailyOutcome};
use lojinha_economy::messages::MessageCooldowns;
use lojinha_economy::{boosts, emoji, leveling, milestones};
use lojinha_types::api::{
    ActivationResponse, DailyRewardResponse, MessageRewardResponse, MilestoneReward,
};
use lojinha_types::models::{ProductCategory, TransactionKind};

use crate::error::ApiError;

const MILESTONE_BADGE_ICON: &str = "🏆";

fn record(
    conn: &lojinha_db::Transaction<'_>,
    user_id: &str,
    amount: i64,
    kind: TransactionKind,
    description: &str,
    reference_id: Option<&str>,
    now: &str,
) -> anyhow::Result<()> {
    ledger::insert_transaction(
        conn,
        &NewTransaction {
            id: &Uuid::new_v4().to_string(),
            user_id,
            amount,
            kind: kind.as_str(),
            description: Some(description),
            reference_id,
            created_at: now,
        },
    )
}

/// Pay today's daily reward, or report when the next one is available.
pub(crate) fn claim_daily(
    db: &Database,
    user_id: &str,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<DailyRewardResponse, ApiError> {
    db.transaction(|tx| {
        let user = users::get_by_id(tx, user_id)?.ok_or_else(|| ApiError::not_found("user not found"))?;
        let last_claim = user.last_daily_claim.as_deref().map(parse_db_time).transpose()?;

        match daily::evaluate(last_claim, user.daily_streak, now, offset) {
            DailyOutcome::AlreadyClaimed { streak, hours_left } => Ok(DailyRewardResponse {
                claimed: false,
                coins: 0,
                streak,
                streak_bonus: 0,
                balance: user.coins,
                hours_left: Some(hours_left),
                message: daily::render_already_claimed(streak, hours_left),
            }),
            DailyOutcome::Claimable(grant) => {
                let stamp = db_time(now);
                let balance = users::add_coins(tx, user_id, grant.total, &stamp)?
                    .ok_or_else(|| anyhow!("daily credit refused for {user_id}"))?;
                users::set_daily(tx, user_id, grant.streak, &stamp)?;
                record(
                    tx,
                    user_id,
                    grant.total,
                    TransactionKind::DailyReward,
                    &format!("Daily reward (streak {})", grant.streak),
                    None,
                    &stamp,
                )?;

                Ok(DailyRewardResponse {
                    claimed: true,
                    coins: grant.total,
                    streak: grant.streak,
                    streak_bonus: grant.streak_bonus,
                    balance,
                    hours_left: None,
                    message: daily::render_claimed(&grant, balance),
                })
            }
        }
    })
}

/// Side effects of one WhatsApp message from `number`: message count, XP
/// with level-ups and milestone bonus, and the chance-based coin grant.
pub(crate) fn apply_message_reward<R: Rng + ?Sized>(
    db: &Database,
    cooldowns: &MessageCooldowns,
    number: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<MessageRewardResponse, ApiError> {
    let mut started_cooldown = false;
    let result = db.transaction(|tx| {
        let user = users::get_by_number(tx, number)?
            .ok_or_else(|| ApiError::not_found("user not registered"))?;
        if user.is_banned {
            return Err(ApiError::forbidden("this account is banned"));
        }
        let stamp = db_time(now);

        let multiplier = boosts::max_multiplier(
            effects::active_boosts(tx, &user.id, &stamp)?
                .iter()
                .map(|b| b.multiplier),
        );
        let xp_earned = leveling::message_xp(multiplier);
        let progress = leveling::apply_xp(user.level, user.xp, xp_earned);
        users::record_message(tx, &user.id, progress.level, progress.xp, &stamp)?;

        let mut balance = user.coins;

        let milestone = milestones::crossed(user.level, progress.level);
        if let Some(m) = milestone {
            balance = users::add_coins(tx, &user.id, m.coins, &stamp)?
                .ok_or_else(|| anyhow!("milestone credit refused for {}", user.id))?;
            record(
                tx,
                &user.id,
                m.coins,
                TransactionKind::MilestoneBonus,
                &format!("Reached level {}", m.level),
                None,
                &stamp,
            )?;
            ledger::award_badge(
                tx,
                &Uuid::new_v4().to_string(),
                &user.id,
                &format!("Level {}", m.level),
                MILESTONE_BADGE_ICON,
                &stamp,
            )?;
        }

        let coins_earned = cooldowns.try_earn(number, now, rng).unwrap_or(0);
        if coins_earned > 0 {
            started_cooldown = true;
            balance = users::add_coins(tx, &user.id, coins_earned, &stamp)?
                .ok_or_else(|| anyhow!("message credit refused for {}", user.id))?;
            record(
                tx,
                &user.id,
                coins_earned,
                TransactionKind::MessageEarn,
                "Chat activity",
                None,
                &stamp,
            )?;
        }

        Ok(MessageRewardResponse {
            coins_earned,
            balance,
            xp_earned,
            multiplier,
            level: progress.level,
            leveled_up: progress.leveled_up(),
            milestone: milestone.map(|m| MilestoneReward {
                level: m.level,
                coins: m.coins,
            }),
            reaction_emoji: effects::active_emoji(tx, &user.id)?,
        })
    });

    // Rolled back, so the coins were never paid.
    if result.is_err() && started_cooldown {
        cooldowns.release(number, now);
    }
    result
}

/// Use an owned item. Boosts are consumed; emojis toggle as the reaction.
pub(crate) fn activate_item(
    db: &Database,
    user_id: &str,
    product_id: &str,
    now: DateTime<Utc>,
    boosts_only: bool,
) -> Result<ActivationResponse, ApiError> {
    db.transaction(|tx| {
        let product = store::get_product(tx, product_id)?
            .ok_or_else(|| ApiError::not_found("product not found"))?;
        let category = ProductCategory::parse(&product.category);
        if boosts_only && category != Some(ProductCategory::Boost) {
            return Err(ApiError::unprocessable("this item is not a boost"));
        }
        let item_id = store::find_item(tx, user_id, product_id)?
            .ok_or_else(|| ApiError::not_found("you do not own this item"))?;
        let stamp = db_time(now);

        match category {
            Some(ProductCategory::Boost) => {
                let spec = boosts::parse_boost_name(&product.name);
                let expires_at = spec.expires_at(now);
                effects::insert_boost(
                    tx,
                    &Uuid::new_v4().to_string(),
                    user_id,
                    product_id,
                    spec.multiplier,
                    &db_time(expires_at),
                    &stamp,
                )?;
                store::delete_item(tx, &item_id)?;
                Ok(ActivationResponse::Boost {
                    multiplier: spec.multiplier,
                    expires_at,
                })
            }
            Some(ProductCategory::Emoji) => {
                let emoji = emoji::extract_reaction_emoji(&product.name);
                let active = effects::toggle_emoji(
                    tx,
                    &Uuid::new_v4().to_string(),
                    user_id,
                    product_id,
                    &emoji,
                    &stamp,
                )?;
                Ok(ActivationResponse::Emoji { emoji, active })
            }
            _ => Err(ApiError::unprocessable("this item cannot be activated")),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lojinha_db::models::NewProduct;
    use lojinha_economy::messages::COOLDOWN_SECS;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const NUMBER: &str = "5511987654321";

    fn now() -> DateTime<Utc> {
        "2026-03-10T15:00:00Z".parse().unwrap()
    }

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn setup() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4().to_string();
        db.with_conn(|c| users::insert(c, &id, NUMBER, "Ana", &db_time(now())))
            .unwrap();
        (db, id)
    }

    fn give_product(db: &Database, user_id: &str, name: &str, category: &str) -> String {
        let product_id = Uuid::new_v4().to_string();
        let stamp = db_time(now());
        db.with_conn(|c| {
            store::insert_product(
                c,
                &NewProduct {
                    id: &product_id,
                    name,
                    description: None,
                    category,
                    price: 10,
                    image_url: None,
                    rarity: "common",
                    is_limited: false,
                    stock: None,
                    created_at: &stamp,
                },
            )?;
            store::insert_item(c, &Uuid::new_v4().to_string(), user_id, &product_id, &stamp)
        })
        .unwrap();
        product_id
    }

    #[test]
    fn daily_claim_once_per_day() {
        let (db, id) = setup();

        let first = claim_daily(&db, &id, now(), brt()).unwrap();
        assert!(first.claimed);
        assert_eq!(first.coins, 50);
        assert_eq!(first.balance, 50);

        let again = claim_daily(&db, &id, now() + Duration::hours(2), brt()).unwrap();
        assert!(!again.claimed);
        assert_eq!(again.balance, 50);
        assert!(again.hours_left.is_some());

        let next_day = claim_daily(&db, &id, now() + Duration::days(1), brt()).unwrap();
        assert!(next_day.claimed);
        assert_eq!(next_day.streak, 2);
        assert_eq!(next_day.coins, 60);
        assert_eq!(next_day.balance, 110);

        let txs = db.with_conn(|c| ledger::list_transactions(c, &id, 50)).unwrap();
        assert_eq!(txs.len(), 2);
        assert!(txs.iter().all(|t| t.kind == "daily_reward"));
    }

    #[test]
    fn message_reward_levels_up_and_pays_milestone() {
        let (db, id) = setup();
        // One message short of level 5.
        db.with_conn(|c| users::record_message(c, &id, 4, 395, &db_time(now())))
            .unwrap();
        let cooldowns = MessageCooldowns::new();
        let mut rng = StdRng::seed_from_u64(11);

        let reward = apply_message_reward(&db, &cooldowns, NUMBER, now(), &mut rng).unwrap();
        assert_eq!(reward.xp_earned, 10);
        assert_eq!(reward.level, 5);
        assert!(reward.leveled_up);
        assert_eq!(reward.milestone.as_ref().map(|m| m.coins), Some(100));
        assert_eq!(reward.balance, 100 + reward.coins_earned);

        let badges = db.with_conn(|c| ledger::list_badges(c, &id)).unwrap();
        assert_eq!(badges[0].badge_name, "Level 5");

        let user = db.with_conn(|c| users::get_by_id(c, &id)).unwrap().unwrap();
        assert_eq!(user.total_messages, 2);
        assert_eq!(user.xp, 5);
    }

    #[test]
    fn failed_grant_does_not_start_cooldown() {
        let (db, _) = setup();
        db.with_conn(|c| {
            Ok(c.execute_batch(
                "CREATE TRIGGER fail_earn BEFORE INSERT ON transactions
                 WHEN NEW.type = 'message_earn'
                 BEGIN SELECT RAISE(ABORT, 'ledger offline'); END;",
            )?)
        })
        .unwrap();
        let cooldowns = MessageCooldowns::new();
        let mut rng = StdRng::seed_from_u64(9);

        let failures = (0..50)
            .filter(|_| apply_message_reward(&db, &cooldowns, NUMBER, now(), &mut rng).is_err())
            .count();
        assert!(failures > 1, "only {failures} grants attempted");

        // Nothing left to expire: every attempted grant released its cooldown.
        assert_eq!(cooldowns.prune(now() + Duration::seconds(COOLDOWN_SECS + 1)), 0);
        let user = db.with_conn(|c| users::get_by_number(c, NUMBER)).unwrap().unwrap();
        assert_eq!(user.coins, 0);
    }

    #[test]
    fn boost_multiplies_message_xp() {
        let (db, id) = setup();
        let boost = give_product(&db, &id, "Boost XP 2x (24h)", "boost");
        activate_item(&db, &id, &boost, now(), false).unwrap();

        let cooldowns = MessageCooldowns::new();
        let mut rng = StdRng::seed_from_u64(5);
        let reward = apply_message_reward(&db, &cooldowns, NUMBER, now(), &mut rng).unwrap();
        assert_eq!(reward.multiplier, 2.0);
        assert_eq!(reward.xp_earned, 20);
    }

    #[test]
    fn unknown_or_banned_sender_is_rejected() {
        let (db, id) = setup();
        let cooldowns = MessageCooldowns::new();
        let mut rng = StdRng::seed_from_u64(1);

        let err = apply_message_reward(&db, &cooldowns, "5511900000000", now(), &mut rng).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        db.with_conn(|c| users::toggle_ban(c, &id, &db_time(now()))).unwrap();
        let err = apply_message_reward(&db, &cooldowns, NUMBER, now(), &mut rng).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn boost_activation_consumes_item() {
        let (db, id) = setup();
        let boost = give_product(&db, &id, "Boost XP 3x (2h)", "boost");

        match activate_item(&db, &id, &boost, now(), true).unwrap() {
            ActivationResponse::Boost { multiplier, expires_at } => {
                assert_eq!(multiplier, 3.0);
                assert_eq!(expires_at, now() + Duration::hours(2));
            }
            other => panic!("unexpected activation {other:?}"),
        }

        let err = activate_item(&db, &id, &boost, now(), true).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn emoji_activation_toggles_and_keeps_item() {
        let (db, id) = setup();
        let fire = give_product(&db, &id, "Reaction 🔥", "emoji");

        let on = activate_item(&db, &id, &fire, now(), false).unwrap();
        assert!(matches!(on, ActivationResponse::Emoji { active: true, ref emoji } if emoji == "🔥"));

        let off = activate_item(&db, &id, &fire, now(), false).unwrap();
        assert!(matches!(off, ActivationResponse::Emoji { active: false, .. }));

        // Bot activation only accepts boosts.
        let err = activate_item(&db, &id, &fire, now(), true).unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable(_)));
    }

    #[test]
    fn cosmetics_cannot_be_activated() {
        let (db, id) = setup();
        let frame = give_product(&db, &id, "Gold frame", "frame");
        let err = activate_item(&db, &id, &frame, now(), false).unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable(_)));
    }
}
