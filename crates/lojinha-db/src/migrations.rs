use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                  TEXT PRIMARY KEY,
                whatsapp_number     TEXT NOT NULL UNIQUE,
                name                TEXT NOT NULL,
                avatar_url          TEXT,
                level               INTEGER NOT NULL DEFAULT 1,
                xp                  INTEGER NOT NULL DEFAULT 0,
                prestige            INTEGER NOT NULL DEFAULT 0,
                coins               INTEGER NOT NULL DEFAULT 0 CHECK (coins >= 0),
                is_admin            INTEGER NOT NULL DEFAULT 0,
                is_banned           INTEGER NOT NULL DEFAULT 0,
                equipped_avatar     TEXT,
                equipped_frame      TEXT,
                equipped_title      TEXT,
                daily_streak        INTEGER NOT NULL DEFAULT 0,
                last_daily_claim    TEXT,
                total_messages      INTEGER NOT NULL DEFAULT 0,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE TABLE products (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT,
                category    TEXT NOT NULL CHECK (category IN
                    ('avatar', 'badge', 'frame', 'title', 'emoji', 'boost', 'special')),
                price       INTEGER NOT NULL CHECK (price >= 0),
                image_url   TEXT,
                rarity      TEXT NOT NULL DEFAULT 'common',
                is_active   INTEGER NOT NULL DEFAULT 1,
                is_limited  INTEGER NOT NULL DEFAULT 0,
                stock       INTEGER CHECK (stock IS NULL OR stock >= 0),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE user_items (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                product_id      TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                purchased_at    TEXT NOT NULL
            );

            CREATE INDEX idx_user_items_owner ON user_items(user_id, product_id);

            CREATE TABLE raffles (
                id                      TEXT PRIMARY KEY,
                title                   TEXT NOT NULL,
                description             TEXT,
                prize_description       TEXT NOT NULL,
                prize_type              TEXT NOT NULL CHECK (prize_type IN ('virtual', 'real', 'mixed')),
                prize_image_url         TEXT,
                entry_cost              INTEGER NOT NULL DEFAULT 0 CHECK (entry_cost >= 0),
                max_entries_per_user    INTEGER,
                status                  TEXT NOT NULL DEFAULT 'active'
                    CHECK (status IN ('active', 'ended', 'cancelled')),
                ends_at                 TEXT NOT NULL,
                winner_id               TEXT REFERENCES users(id) ON DELETE SET NULL,
                notification_group      TEXT,
                created_at              TEXT NOT NULL
            );

            CREATE TABLE raffle_entries (
                id              TEXT PRIMARY KEY,
                raffle_id       TEXT NOT NULL REFERENCES raffles(id) ON DELETE CASCADE,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                entries_count   INTEGER NOT NULL DEFAULT 1 CHECK (entries_count > 0),
                entered_at      TEXT NOT NULL,
                UNIQUE(raffle_id, user_id)
            );

            CREATE TABLE transactions (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                amount          INTEGER NOT NULL,
                type            TEXT NOT NULL,
                description     TEXT,
                reference_id    TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_transactions_user ON transactions(user_id, created_at);

            CREATE TABLE user_active_boosts (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                product_id  TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                boost_type  TEXT NOT NULL DEFAULT 'xp',
                multiplier  REAL NOT NULL,
                expires_at  TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_boosts_user ON user_active_boosts(user_id, expires_at);

            CREATE TABLE user_active_emojis (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                product_id  TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                emoji       TEXT NOT NULL,
                is_active   INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL,
                UNIQUE(user_id, product_id)
            );

            CREATE TABLE user_badges (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                badge_name  TEXT NOT NULL,
                badge_icon  TEXT NOT NULL,
                earned_at   TEXT NOT NULL,
                UNIQUE(user_id, badge_name)
            );

            CREATE TABLE auth_codes (
                id              TEXT PRIMARY KEY,
                whatsapp_number TEXT NOT NULL,
                code_hash       TEXT NOT NULL,
                expires_at      TEXT NOT NULL,
                used            INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_auth_codes_number ON auth_codes(whatsapp_number, created_at);

            CREATE TABLE user_sessions (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at  TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
