//! Timed boosts and reaction emojis.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{ActiveBoostRow, EmojiStateRow};

// -- Boosts --

pub fn insert_boost(
    conn: &Connection,
    id: &str,
    user_id: &str,
    product_id: &str,
    multiplier: f64,
    expires_at: &str,
    now: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO user_active_boosts (id, user_id, product_id, multiplier, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![id, user_id, product_id, multiplier, expires_at, now],
    )?;
    Ok(())
}

/// Unexpired boosts, the one ending soonest first.
pub fn active_boosts(conn: &Connection, user_id: &str, now: &str) -> Result<Vec<ActiveBoostRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, product_id, multiplier, expires_at FROM user_active_boosts
         WHERE user_id = ?1 AND expires_at > ?2
         ORDER BY expires_at ASC",
    )?;
    let rows = stmt
        .query_map((user_id, now), |row| {
            Ok(ActiveBoostRow {
                id: row.get(0)?,
                product_id: row.get(1)?,
                multiplier: row.get(2)?,
                expires_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_expired_boosts(conn: &Connection, now: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM user_active_boosts WHERE expires_at <= ?1", [now])?)
}

// -- Emojis --

/// The emoji the bot should react with for this user, if one is selected.
pub fn active_emoji(conn: &Connection, user_id: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare(
        "SELECT emoji FROM user_active_emojis WHERE user_id = ?1 AND is_active = 1
         ORDER BY created_at DESC LIMIT 1",
    )?;
    let mut rows = stmt.query([user_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

pub fn emoji_states(conn: &Connection, user_id: &str) -> Result<Vec<EmojiStateRow>> {
    let mut stmt = conn.prepare(
        "SELECT product_id, emoji, is_active FROM user_active_emojis
         WHERE user_id = ?1 ORDER BY created_at ASC",
    )?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(EmojiStateRow {
                product_id: row.get(0)?,
                emoji: row.get(1)?,
                is_active: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Toggle the reaction emoji for a product.
///
/// Selecting a new emoji deselects every other one; selecting the active
/// one turns reactions off. Returns whether the emoji is active afterwards.
pub fn toggle_emoji(
    conn: &Connection,
    id: &str,
    user_id: &str,
    product_id: &str,
    emoji: &str,
    now: &str,
) -> Result<bool> {
    let currently_active: bool = conn
        .query_row(
            "SELECT COALESCE(MAX(is_active), 0) FROM user_active_emojis
             WHERE user_id = ?1 AND product_id = ?2",
            (user_id, product_id),
            |row| row.get(0),
        )?;

    conn.execute(
        "UPDATE user_active_emojis SET is_active = 0 WHERE user_id = ?1",
        [user_id],
    )?;

    if currently_active {
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO user_active_emojis (id, user_id, product_id, emoji, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5)
         ON CONFLICT(user_id, product_id) DO UPDATE SET is_active = 1, emoji = excluded.emoji",
        (id, user_id, product_id, emoji, now),
    )?;
    Ok(true)
}
