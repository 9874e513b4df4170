//! One-time login codes and sessions.

use anyhow::Result;
use rusqlite::Connection;

use super::OptionalExt;
use crate::models::SessionRow;

pub fn insert_code(
    conn: &Connection,
    id: &str,
    whatsapp_number: &str,
    code_hash: &str,
    expires_at: &str,
    now: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO auth_codes (id, whatsapp_number, code_hash, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (id, whatsapp_number, code_hash, expires_at, now),
    )?;
    Ok(())
}

/// Mark a matching unused, unexpired code as used. Returns `false` when no
/// such code exists, so each code works at most once.
pub fn consume_code(conn: &Connection, whatsapp_number: &str, code_hash: &str, now: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE auth_codes SET used = 1
         WHERE id = (
             SELECT id FROM auth_codes
             WHERE whatsapp_number = ?1 AND code_hash = ?2 AND used = 0 AND expires_at > ?3
             ORDER BY created_at DESC LIMIT 1
         )",
        (whatsapp_number, code_hash, now),
    )?;
    Ok(changed > 0)
}

/// Drop codes that are used or past expiry.
pub fn delete_stale_codes(conn: &Connection, now: &str) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM auth_codes WHERE used = 1 OR expires_at <= ?1",
        [now],
    )?)
}

pub fn insert_session(conn: &Connection, id: &str, user_id: &str, expires_at: &str, now: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO user_sessions (id, user_id, expires_at, created_at) VALUES (?1, ?2, ?3, ?4)",
        (id, user_id, expires_at, now),
    )?;
    Ok(())
}

/// A session that exists and has not expired.
pub fn live_session(conn: &Connection, id: &str, now: &str) -> Result<Option<SessionRow>> {
    conn.query_row(
        "SELECT id, user_id, expires_at FROM user_sessions WHERE id = ?1 AND expires_at > ?2",
        (id, now),
        |row| {
            Ok(SessionRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                expires_at: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn delete_session(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM user_sessions WHERE id = ?1", [id])? > 0)
}

pub fn delete_expired_sessions(conn: &Connection, now: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM user_sessions WHERE expires_at <= ?1", [now])?)
}
