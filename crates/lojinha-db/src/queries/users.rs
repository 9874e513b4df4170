use anyhow::Result;
use lojinha_types::models::RankingSort;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::models::UserRow;

const USER_COLUMNS: &str = "id, whatsapp_number, name, avatar_url, level, xp, prestige, coins, \
     is_admin, is_banned, equipped_avatar, equipped_frame, equipped_title, daily_streak, \
     last_daily_claim, total_messages, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        whatsapp_number: row.get(1)?,
        name: row.get(2)?,
        avatar_url: row.get(3)?,
        level: row.get(4)?,
        xp: row.get(5)?,
        prestige: row.get(6)?,
        coins: row.get(7)?,
        is_admin: row.get(8)?,
        is_banned: row.get(9)?,
        equipped_avatar: row.get(10)?,
        equipped_frame: row.get(11)?,
        equipped_title: row.get(12)?,
        daily_streak: row.get(13)?,
        last_daily_claim: row.get(14)?,
        total_messages: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

pub fn insert(conn: &Connection, id: &str, whatsapp_number: &str, name: &str, now: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, whatsapp_number, name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        (id, whatsapp_number, name, now),
    )?;
    Ok(())
}

pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        user_from_row,
    )
    .optional()
}

pub fn get_by_number(conn: &Connection, whatsapp_number: &str) -> Result<Option<UserRow>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE whatsapp_number = ?1"),
        [whatsapp_number],
        user_from_row,
    )
    .optional()
}

/// Every user, newest first.
pub fn list_all(conn: &Connection) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id"
    ))?;
    let rows = stmt
        .query_map([], user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Non-banned users ordered for the leaderboard.
pub fn ranking(conn: &Connection, sort: RankingSort, limit: u32) -> Result<Vec<UserRow>> {
    let order = match sort {
        RankingSort::Level => "level DESC, xp DESC, coins DESC",
        RankingSort::Xp => "xp DESC, level DESC",
        RankingSort::Coins => "coins DESC, level DESC",
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE is_banned = 0
         ORDER BY {order}, created_at ASC LIMIT ?1"
    ))?;
    let rows = stmt
        .query_map([limit], user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Apply the provided fields; `None` leaves a field unchanged.
pub fn update_profile(
    conn: &Connection,
    id: &str,
    name: Option<&str>,
    avatar_url: Option<&str>,
    now: &str,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE users SET
            name = COALESCE(?2, name),
            avatar_url = COALESCE(?3, avatar_url),
            updated_at = ?4
         WHERE id = ?1",
        (id, name, avatar_url, now),
    )?;
    Ok(changed > 0)
}

pub fn set_admin(conn: &Connection, id: &str, is_admin: bool, now: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET is_admin = ?2, updated_at = ?3 WHERE id = ?1",
        (id, is_admin, now),
    )?;
    Ok(())
}

/// Flip the ban flag. Returns the new value, or `None` for an unknown user.
pub fn toggle_ban(conn: &Connection, id: &str, now: &str) -> Result<Option<bool>> {
    conn.query_row(
        "UPDATE users SET is_banned = NOT is_banned, updated_at = ?2
         WHERE id = ?1 RETURNING is_banned",
        (id, now),
        |row| row.get(0),
    )
    .optional()
}

/// Add `delta` (possibly negative) to the balance unless the result would
/// go below zero. Returns the new balance, or `None` when the guard refused
/// the change or the user does not exist.
pub fn add_coins(conn: &Connection, id: &str, delta: i64, now: &str) -> Result<Option<i64>> {
    conn.query_row(
        "UPDATE users SET coins = coins + ?2, updated_at = ?3
         WHERE id = ?1 AND coins + ?2 >= 0 RETURNING coins",
        (id, delta, now),
        |row| row.get(0),
    )
    .optional()
}

pub fn set_daily(conn: &Connection, id: &str, streak: i64, claimed_at: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET daily_streak = ?2, last_daily_claim = ?3, updated_at = ?3 WHERE id = ?1",
        (id, streak, claimed_at),
    )?;
    Ok(())
}

/// Store new level/XP and count one more message.
pub fn record_message(conn: &Connection, id: &str, level: i64, xp: i64, now: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET level = ?2, xp = ?3, total_messages = total_messages + 1, updated_at = ?4
         WHERE id = ?1",
        (id, level, xp, now),
    )?;
    Ok(())
}
