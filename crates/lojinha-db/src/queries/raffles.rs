use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::models::{NewRaffle, RaffleRow, RaffleSummaryRow, TicketRow};

const RAFFLE_COLUMNS: &str = "r.id, r.title, r.description, r.prize_description, r.prize_type, \
     r.prize_image_url, r.entry_cost, r.max_entries_per_user, r.status, r.ends_at, r.winner_id, \
     r.notification_group, r.created_at";

fn raffle_from_row(row: &Row<'_>) -> rusqlite::Result<RaffleRow> {
    Ok(RaffleRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        prize_description: row.get(3)?,
        prize_type: row.get(4)?,
        prize_image_url: row.get(5)?,
        entry_cost: row.get(6)?,
        max_entries_per_user: row.get(7)?,
        status: row.get(8)?,
        ends_at: row.get(9)?,
        winner_id: row.get(10)?,
        notification_group: row.get(11)?,
        created_at: row.get(12)?,
    })
}

pub fn insert(conn: &Connection, r: &NewRaffle<'_>) -> Result<()> {
    conn.execute(
        "INSERT INTO raffles
            (id, title, description, prize_description, prize_type, prize_image_url,
             entry_cost, max_entries_per_user, ends_at, notification_group, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            r.id,
            r.title,
            r.description,
            r.prize_description,
            r.prize_type,
            r.prize_image_url,
            r.entry_cost,
            r.max_entries_per_user,
            r.ends_at,
            r.notification_group,
            r.created_at,
        ],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<RaffleRow>> {
    conn.query_row(
        &format!("SELECT {RAFFLE_COLUMNS} FROM raffles r WHERE r.id = ?1"),
        [id],
        raffle_from_row,
    )
    .optional()
}

/// Raffles with entry totals and the winner's name, soonest ending first.
///
/// `viewer` fills `my_entries`; without one it is always zero.
pub fn list(conn: &Connection, status: Option<&str>, viewer: Option<&str>) -> Result<Vec<RaffleSummaryRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RAFFLE_COLUMNS},
                w.name,
                (SELECT COALESCE(SUM(entries_count), 0) FROM raffle_entries WHERE raffle_id = r.id),
                (SELECT COALESCE(SUM(entries_count), 0) FROM raffle_entries
                    WHERE raffle_id = r.id AND user_id = ?2)
         FROM raffles r LEFT JOIN users w ON w.id = r.winner_id
         WHERE ?1 IS NULL OR r.status = ?1
         ORDER BY r.ends_at ASC, r.id"
    ))?;
    let rows = stmt
        .query_map((status, viewer), |row| {
            Ok(RaffleSummaryRow {
                raffle: raffle_from_row(row)?,
                winner_name: row.get(13)?,
                total_entries: row.get(14)?,
                my_entries: row.get(15)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn user_entries(conn: &Connection, raffle_id: &str, user_id: &str) -> Result<i64> {
    let count: Option<i64> = conn
        .query_row(
            "SELECT entries_count FROM raffle_entries WHERE raffle_id = ?1 AND user_id = ?2",
            (raffle_id, user_id),
            |row| row.get(0),
        )
        .optional()?;
    Ok(count.unwrap_or(0))
}

/// Add one entry for the user, creating their row on first entry.
/// Returns the user's entry count afterwards.
pub fn add_entry(conn: &Connection, id: &str, raffle_id: &str, user_id: &str, now: &str) -> Result<i64> {
    let count = conn.query_row(
        "INSERT INTO raffle_entries (id, raffle_id, user_id, entries_count, entered_at)
         VALUES (?1, ?2, ?3, 1, ?4)
         ON CONFLICT(raffle_id, user_id) DO UPDATE SET
            entries_count = entries_count + 1,
            entered_at = excluded.entered_at
         RETURNING entries_count",
        (id, raffle_id, user_id, now),
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn tickets(conn: &Connection, raffle_id: &str) -> Result<Vec<TicketRow>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, entries_count FROM raffle_entries WHERE raffle_id = ?1 ORDER BY entered_at",
    )?;
    let rows = stmt
        .query_map([raffle_id], |row| {
            Ok(TicketRow {
                user_id: row.get(0)?,
                entries_count: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Record the winner and end the raffle. Returns `false` if a winner was
/// already set, so a raffle is never drawn twice.
pub fn set_winner(conn: &Connection, raffle_id: &str, winner_id: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE raffles SET winner_id = ?2, status = 'ended'
         WHERE id = ?1 AND winner_id IS NULL",
        (raffle_id, winner_id),
    )?;
    Ok(changed > 0)
}
