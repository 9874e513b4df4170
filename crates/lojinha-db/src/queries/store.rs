use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::models::{NewProduct, OwnedItemRow, ProductRow};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.category, p.price, p.image_url, \
     p.rarity, p.is_active, p.is_limited, p.stock, p.created_at, p.updated_at";

/// Reads the product columns starting at `offset`.
fn product_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        description: row.get(offset + 2)?,
        category: row.get(offset + 3)?,
        price: row.get(offset + 4)?,
        image_url: row.get(offset + 5)?,
        rarity: row.get(offset + 6)?,
        is_active: row.get(offset + 7)?,
        is_limited: row.get(offset + 8)?,
        stock: row.get(offset + 9)?,
        created_at: row.get(offset + 10)?,
        updated_at: row.get(offset + 11)?,
    })
}

// -- Products --

pub fn insert_product(conn: &Connection, p: &NewProduct<'_>) -> Result<()> {
    conn.execute(
        "INSERT INTO products
            (id, name, description, category, price, image_url, rarity, is_limited, stock,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        rusqlite::params![
            p.id,
            p.name,
            p.description,
            p.category,
            p.price,
            p.image_url,
            p.rarity,
            p.is_limited,
            p.stock,
            p.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_product(conn: &Connection, id: &str) -> Result<Option<ProductRow>> {
    conn.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ?1"),
        [id],
        |row| product_at(row, 0),
    )
    .optional()
}

/// Active products, optionally of one category, cheapest first.
pub fn list_active(conn: &Connection, category: Option<&str>) -> Result<Vec<ProductRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products p
         WHERE p.is_active = 1 AND (?1 IS NULL OR p.category = ?1)
         ORDER BY p.price ASC, p.name ASC"
    ))?;
    let rows = stmt
        .query_map([category], |row| product_at(row, 0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Every product including inactive ones, newest first.
pub fn list_all(conn: &Connection) -> Result<Vec<ProductRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products p ORDER BY p.created_at DESC, p.id"
    ))?;
    let rows = stmt
        .query_map([], |row| product_at(row, 0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Hard delete. Owned items and effects go with it.
pub fn delete_product(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM products WHERE id = ?1", [id])? > 0)
}

/// Take one unit from a limited product. Unlimited products always succeed;
/// a limited product at zero stock returns `false`.
pub fn take_stock(conn: &Connection, id: &str, now: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE products SET stock = stock - 1, updated_at = ?2
         WHERE id = ?1 AND stock IS NOT NULL AND stock > 0",
        (id, now),
    )?;
    if changed > 0 {
        return Ok(true);
    }
    let unlimited: Option<bool> = conn
        .query_row("SELECT stock IS NULL FROM products WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    Ok(unlimited.unwrap_or(false))
}

// -- Owned items --

pub fn insert_item(conn: &Connection, id: &str, user_id: &str, product_id: &str, now: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO user_items (id, user_id, product_id, purchased_at) VALUES (?1, ?2, ?3, ?4)",
        (id, user_id, product_id, now),
    )?;
    Ok(())
}

/// One of the user's items for this product, if any.
pub fn find_item(conn: &Connection, user_id: &str, product_id: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT id FROM user_items WHERE user_id = ?1 AND product_id = ?2
         ORDER BY purchased_at ASC LIMIT 1",
        (user_id, product_id),
        |row| row.get(0),
    )
    .optional()
}

pub fn delete_item(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM user_items WHERE id = ?1", [id])? > 0)
}

/// Items owned by a user joined with their products, newest purchase first.
pub fn list_items(conn: &Connection, user_id: &str) -> Result<Vec<OwnedItemRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT i.id, i.purchased_at, {PRODUCT_COLUMNS}
         FROM user_items i JOIN products p ON p.id = i.product_id
         WHERE i.user_id = ?1
         ORDER BY i.purchased_at DESC, i.id"
    ))?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(OwnedItemRow {
                id: row.get(0)?,
                purchased_at: row.get(1)?,
                product: product_at(row, 2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{NOW, conn, product, user};

    #[test]
    fn list_active_filters_by_category() {
        let conn = conn();
        product(&conn, "frame-gold", "frame", 300, None);
        product(&conn, "boost-2x", "boost", 100, None);
        conn.execute("UPDATE products SET is_active = 0 WHERE id = 'frame-gold'", []).unwrap();

        let all: Vec<String> = list_active(&conn, None).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(all, ["boost-2x"]);
        assert!(list_active(&conn, Some("frame")).unwrap().is_empty());
        assert_eq!(list_all(&conn).unwrap().len(), 2);
    }

    #[test]
    fn stock_runs_out() {
        let conn = conn();
        product(&conn, "limited", "special", 10, Some(1));
        product(&conn, "plenty", "special", 10, None);

        assert!(take_stock(&conn, "limited", NOW).unwrap());
        assert!(!take_stock(&conn, "limited", NOW).unwrap());
        assert_eq!(get_product(&conn, "limited").unwrap().unwrap().stock, Some(0));

        assert!(take_stock(&conn, "plenty", NOW).unwrap());
        assert!(!take_stock(&conn, "missing", NOW).unwrap());
    }

    #[test]
    fn deleting_product_removes_owned_items() {
        let conn = conn();
        user(&conn, "u1", "5511900000001", 0);
        product(&conn, "badge", "badge", 10, None);
        insert_item(&conn, "i1", "u1", "badge", NOW).unwrap();

        assert_eq!(list_items(&conn, "u1").unwrap().len(), 1);
        assert_eq!(find_item(&conn, "u1", "badge").unwrap().as_deref(), Some("i1"));

        assert!(delete_product(&conn, "badge").unwrap());
        assert!(list_items(&conn, "u1").unwrap().is_empty());
    }
}
