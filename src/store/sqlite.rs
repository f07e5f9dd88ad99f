//! SQLite persistence via sqlx.
//!
//! One pool-backed store implementing every repository trait. Prices are
//! stored as TEXT and parsed into `Decimal` to avoid float drift.
//! The schema is created at startup with idempotent DDL; migration
//! tooling is out of scope.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

use super::{BetStore, CartStore, GameStore, SessionAuth};
use crate::types::{AuthUser, Bet, BetDraft, BetError, Cart, Game, NewGame};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS tokens (
    token TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS carts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    min_value TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cart_id INTEGER NOT NULL REFERENCES carts(id) ON DELETE CASCADE,
    type TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    color TEXT NOT NULL,
    number_range INTEGER NOT NULL,
    price TEXT NOT NULL,
    max_number INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS bets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    chosen_numbers TEXT NOT NULL,
    price TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Pool-backed SQLite store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl From<sqlx::Error> for BetError {
    fn from(e: sqlx::Error) -> Self {
        BetError::Storage(e.to_string())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = e {
        db.is_unique_violation()
    } else {
        false
    }
}

fn parse_price(raw: &str) -> Result<Decimal, BetError> {
    Decimal::from_str(raw).map_err(|e| BetError::Storage(format!("bad price '{raw}': {e}")))
}

fn game_from_row(row: &SqliteRow) -> Result<Game, BetError> {
    Ok(Game {
        id: row.try_get("id")?,
        game_type: row.try_get("type")?,
        description: row.try_get("description")?,
        color: row.try_get("color")?,
        range: row.try_get("number_range")?,
        max_number: row.try_get("max_number")?,
        price: parse_price(&row.try_get::<String, _>("price")?)?,
        cart_id: row.try_get("cart_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn cart_from_row(row: &SqliteRow) -> Result<Cart, BetError> {
    Ok(Cart {
        id: row.try_get("id")?,
        min_value: parse_price(&row.try_get::<String, _>("min_value")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn bet_from_row(row: &SqliteRow) -> Result<Bet, BetError> {
    Ok(Bet {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        game_id: row.try_get("game_id")?,
        chosen_numbers: row.try_get("chosen_numbers")?,
        price: parse_price(&row.try_get::<String, _>("price")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &SqliteRow) -> Result<AuthUser, BetError> {
    Ok(AuthUser {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        is_admin: row.try_get("is_admin")?,
    })
}

impl SqliteStore {
    /// Open (or create) the database and prepare the schema.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // A pooled `:memory:` database is one database per connection, so
        // in-memory mode must stay on a single connection.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        info!(url, "SQLite store ready");
        Ok(Self { pool })
    }

    /// Seed the default cart when it doesn't exist yet.
    pub async fn ensure_cart(&self, id: i64, min_value: Decimal) -> Result<(), BetError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO carts (id, min_value, created_at, updated_at)
             VALUES (?, ?, ?, ?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .bind(min_value.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(cart_id = id, min_value = %min_value, "Seeded default cart");
        }
        Ok(())
    }

    /// Insert a user row. Registration flows live elsewhere; this exists
    /// for seeding and tests.
    pub async fn insert_user(
        &self,
        email: &str,
        username: &str,
        is_admin: bool,
    ) -> Result<i64, BetError> {
        let result = sqlx::query("INSERT INTO users (email, username, is_admin) VALUES (?, ?, ?)")
            .bind(email)
            .bind(username)
            .bind(is_admin)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Attach a bearer token to a user. Token issuance lives elsewhere.
    pub async fn insert_token(&self, user_id: i64, token: &str) -> Result<(), BetError> {
        sqlx::query("INSERT INTO tokens (token, user_id) VALUES (?, ?)")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl GameStore for SqliteStore {
    async fn find(&self, id: i64) -> Result<Option<Game>, BetError> {
        let row = sqlx::query("SELECT * FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(game_from_row).transpose()
    }

    async fn find_by_type(&self, game_type: &str) -> Result<Option<Game>, BetError> {
        let row = sqlx::query("SELECT * FROM games WHERE type = ?")
            .bind(game_type)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(game_from_row).transpose()
    }

    async fn list_by_cart(&self, cart_id: i64) -> Result<Vec<Game>, BetError> {
        let rows = sqlx::query("SELECT * FROM games WHERE cart_id = ? ORDER BY id")
            .bind(cart_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(game_from_row).collect()
    }

    async fn create(&self, new: NewGame) -> Result<Game, BetError> {
        let Some(cart_id) = new.cart_id else {
            return Err(BetError::CartNotFound);
        };
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO games
                 (cart_id, type, description, color, number_range, price, max_number,
                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(cart_id)
        .bind(&new.game_type)
        .bind(&new.description)
        .bind(&new.color)
        .bind(new.range)
        .bind(new.price.to_string())
        .bind(new.max_number)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BetError::GameTypeTaken
            } else {
                e.into()
            }
        })?;

        let id = result.last_insert_rowid();
        debug!(game_id = id, game_type = %new.game_type, "Game created");
        GameStore::find(self, id).await?.ok_or(BetError::GameNotFound)
    }

    async fn update(&self, id: i64, new: NewGame) -> Result<Game, BetError> {
        let existing = GameStore::find(self, id).await?.ok_or(BetError::GameNotFound)?;

        // Type must stay unique across all other games.
        if let Some(other) = self.find_by_type(&new.game_type).await? {
            if other.id != existing.id {
                return Err(BetError::GameTypeTaken);
            }
        }

        sqlx::query(
            "UPDATE games
             SET type = ?, description = ?, color = ?, number_range = ?, price = ?,
                 max_number = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&new.game_type)
        .bind(&new.description)
        .bind(&new.color)
        .bind(new.range)
        .bind(new.price.to_string())
        .bind(new.max_number)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        GameStore::find(self, id).await?.ok_or(BetError::GameNotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), BetError> {
        let result = sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BetError::GameNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for SqliteStore {
    async fn find(&self, id: i64) -> Result<Option<Cart>, BetError> {
        let row = sqlx::query("SELECT * FROM carts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(cart_from_row).transpose()
    }
}

#[async_trait]
impl BetStore for SqliteStore {
    async fn bulk_create(&self, drafts: &[BetDraft]) -> Result<Vec<Bet>, BetError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(drafts.len());

        // The transaction rolls back on drop if any insert fails, so a
        // partial batch never becomes visible.
        for draft in drafts {
            let result = sqlx::query(
                "INSERT INTO bets
                     (user_id, game_id, chosen_numbers, price, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(draft.user_id)
            .bind(draft.game_id)
            .bind(&draft.chosen_numbers)
            .bind(draft.price.to_string())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            created.push(Bet {
                id: result.last_insert_rowid(),
                user_id: draft.user_id,
                game_id: draft.game_id,
                chosen_numbers: draft.chosen_numbers.clone(),
                price: draft.price,
                created_at: now,
                updated_at: now,
            });
        }

        tx.commit().await?;
        debug!(count = created.len(), "Bets committed");
        Ok(created)
    }

    async fn find(&self, id: i64) -> Result<Option<Bet>, BetError> {
        let row = sqlx::query("SELECT * FROM bets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(bet_from_row).transpose()
    }

    async fn stale_bettors(&self, cutoff: DateTime<Utc>) -> Result<Vec<AuthUser>, BetError> {
        let rows = sqlx::query(
            "SELECT u.id, u.username, u.email, u.is_admin
             FROM users u JOIN bets b ON b.user_id = u.id
             GROUP BY u.id, u.username, u.email, u.is_admin
             HAVING MAX(b.created_at) < ?",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }
}

#[async_trait]
impl SessionAuth for SqliteStore {
    async fn authenticate(&self, token: &str) -> Result<Option<AuthUser>, BetError> {
        let row = sqlx::query(
            "SELECT u.id, u.username, u.email, u.is_admin
             FROM users u JOIN tokens t ON t.user_id = u.id
             WHERE t.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
