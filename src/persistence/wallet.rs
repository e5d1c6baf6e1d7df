//! Wallet persistence: one row per purchase lot.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::types::holding::{Holding, Lot};

#[derive(Debug, FromRow)]
pub struct LotRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    pub price: i64,
    pub bought_at: DateTime<Utc>,
}

impl From<LotRow> for Lot {
    fn from(row: LotRow) -> Self {
        Lot {
            id: row.id,
            user_id: row.user_id,
            symbol: row.symbol,
            name: row.name,
            shares: row.shares,
            price: row.price,
            bought_at: row.bought_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct HoldingRow {
    pub symbol: String,
    pub name: String,
    pub shares: i64,
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_lot<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    user_id: Uuid,
    symbol: &str,
    name: &str,
    shares: i64,
    price: i64,
    bought_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO wallet (id, user_id, symbol, name, shares, price, bought_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id)
    .bind(user_id)
    .bind(symbol)
    .bind(name)
    .bind(shares)
    .bind(price)
    .bind(bought_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Lots for one symbol, oldest first, locked for update.
pub async fn lock_lots<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    symbol: &str,
) -> Result<Vec<Lot>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LotRow>(
        "SELECT id, user_id, symbol, name, shares, price, bought_at FROM wallet \
         WHERE user_id = $1 AND symbol = $2 ORDER BY bought_at, id FOR UPDATE",
    )
    .bind(user_id)
    .bind(symbol)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Lot::from).collect())
}

pub async fn update_lot_shares<'e, E: PgExecutor<'e>>(
    executor: E,
    lot_id: Uuid,
    shares: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE wallet SET shares = $1 WHERE id = $2")
        .bind(shares)
        .bind(lot_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete_lot<'e, E: PgExecutor<'e>>(
    executor: E,
    lot_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM wallet WHERE id = $1")
        .bind(lot_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Shares per symbol for a user, only symbols with a positive total. The name
/// comes from the most recent lot.
pub async fn list_holdings<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<Holding>, sqlx::Error> {
    let rows = sqlx::query_as::<_, HoldingRow>(
        "SELECT symbol, \
                (array_agg(name ORDER BY bought_at DESC, id DESC))[1] AS name, \
                SUM(shares)::BIGINT AS shares \
         FROM wallet WHERE user_id = $1 \
         GROUP BY symbol HAVING SUM(shares) > 0 ORDER BY symbol",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| Holding {
            symbol: r.symbol,
            name: r.name,
            shares: r.shares,
        })
        .collect())
}
