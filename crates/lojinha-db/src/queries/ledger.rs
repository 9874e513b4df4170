//! Coin transaction log and earned badges.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{BadgeRow, NewTransaction, TransactionRow};

pub fn insert_transaction(conn: &Connection, t: &NewTransaction<'_>) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, user_id, amount, type, description, reference_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            t.id,
            t.user_id,
            t.amount,
            t.kind,
            t.description,
            t.reference_id,
            t.created_at,
        ],
    )?;
    Ok(())
}

/// Most recent transactions first.
pub fn list_transactions(conn: &Connection, user_id: &str, limit: u32) -> Result<Vec<TransactionRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, amount, type, description, reference_id, created_at
         FROM transactions WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC LIMIT ?2",
    )?;
    let rows = stmt
        .query_map((user_id, limit), |row| {
            Ok(TransactionRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                amount: row.get(2)?,
                kind: row.get(3)?,
                description: row.get(4)?,
                reference_id: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Award a badge unless the user already has one with that name.
/// Returns `true` when it was newly awarded.
pub fn award_badge(
    conn: &Connection,
    id: &str,
    user_id: &str,
    name: &str,
    icon: &str,
    now: &str,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO user_badges (id, user_id, badge_name, badge_icon, earned_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (id, user_id, name, icon, now),
    )?;
    Ok(inserted > 0)
}

pub fn list_badges(conn: &Connection, user_id: &str) -> Result<Vec<BadgeRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, badge_name, badge_icon, earned_at FROM user_badges
         WHERE user_id = ?1 ORDER BY earned_at DESC, rowid DESC",
    )?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(BadgeRow {
                id: row.get(0)?,
                badge_name: row.get(1)?,
                badge_icon: row.get(2)?,
                earned_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{NOW, conn, user};

    fn tx<'a>(id: &'a str, amount: i64, created_at: &'a str) -> NewTransaction<'a> {
        NewTransaction {
            id,
            user_id: "u1",
            amount,
            kind: "admin",
            description: None,
            reference_id: None,
            created_at,
        }
    }

    #[test]
    fn transactions_newest_first_with_limit() {
        let conn = conn();
        user(&conn, "u1", "5511900000001", 0);
        insert_transaction(&conn, &tx("t1", 10, "2026-03-10T10:00:00.000Z")).unwrap();
        insert_transaction(&conn, &tx("t2", -5, "2026-03-10T11:00:00.000Z")).unwrap();
        insert_transaction(&conn, &tx("t3", 7, "2026-03-10T09:00:00.000Z")).unwrap();

        let ids: Vec<String> = list_transactions(&conn, "u1", 2)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, ["t2", "t1"]);
    }

    #[test]
    fn badges_are_unique_by_name() {
        let conn = conn();
        user(&conn, "u1", "5511900000001", 0);
        assert!(award_badge(&conn, "b1", "u1", "Level 5", "⭐", NOW).unwrap());
        assert!(!award_badge(&conn, "b2", "u1", "Level 5", "⭐", NOW).unwrap());
        assert_eq!(list_badges(&conn, "u1").unwrap().len(), 1);
    }
}
