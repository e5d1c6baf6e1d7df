//! Transaction log persistence: append and list. Rows are never updated.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::types::transaction::{Transaction, TransactionStatus};

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: i64,
    pub price_per_share: i64,
    pub price: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Skips rows with an unknown status.
fn transaction_row_to_transaction(row: TransactionRow) -> Option<Transaction> {
    let status = TransactionStatus::parse(&row.status)?;
    Some(Transaction {
        id: row.id,
        user_id: row.user_id,
        symbol: row.symbol,
        shares: row.shares,
        price_per_share: row.price_per_share,
        price: row.price,
        status,
        timestamp: row.created_at,
    })
}

pub async fn insert_transaction<'e, E: PgExecutor<'e>>(
    executor: E,
    txn: &Transaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions \
         (id, user_id, symbol, shares, price_per_share, price, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(txn.id)
    .bind(txn.user_id)
    .bind(&txn.symbol)
    .bind(txn.shares)
    .bind(txn.price_per_share)
    .bind(txn.price)
    .bind(txn.status.as_str())
    .bind(txn.timestamp)
    .execute(executor)
    .await?;
    Ok(())
}

/// All transactions for a user, oldest first.
pub async fn list_transactions_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, user_id, symbol, shares, price_per_share, price, status, created_at \
         FROM transactions WHERE user_id = $1 ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(rows
        .into_iter()
        .filter_map(transaction_row_to_transaction)
        .collect())
}
