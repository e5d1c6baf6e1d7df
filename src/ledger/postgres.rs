//! PostgreSQL ledger. Buy and sell run in one database transaction with the
//! user row and the symbol's lots locked.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    BuyOrder, Ledger, LedgerError, SellOrder, affordable_total, normalize_symbol,
    normalize_username, total_cost,
};
use crate::persistence;
use crate::portfolio::consume_lots;
use crate::types::holding::Holding;
use crate::types::money::Cents;
use crate::types::transaction::{Transaction, TransactionStatus};
use crate::types::user::User;

#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: Cents,
    ) -> Result<User, LedgerError> {
        let username = normalize_username(username);
        let id = Uuid::new_v4();
        let inserted =
            persistence::insert_user(&self.pool, id, &username, password_hash, starting_cash).await;
        match inserted {
            Ok(()) => Ok(User {
                id,
                username,
                password_hash: password_hash.to_string(),
                cash: starting_cash,
            }),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(LedgerError::DuplicateUsername(username))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, LedgerError> {
        let username = normalize_username(username);
        let row = persistence::get_user_by_username(&self.pool, &username).await?;
        Ok(row.map(User::from))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, LedgerError> {
        let row = persistence::get_user_by_id(&self.pool, user_id).await?;
        Ok(row.map(User::from))
    }

    async fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<(), LedgerError> {
        let username = normalize_username(username);
        let touched =
            persistence::update_password_hash(&self.pool, &username, password_hash).await?;
        if touched == 0 {
            return Err(LedgerError::UnknownUser);
        }
        Ok(())
    }

    async fn cash(&self, user_id: Uuid) -> Result<Cents, LedgerError> {
        persistence::get_user_by_id(&self.pool, user_id)
            .await?
            .map(|u| u.cash)
            .ok_or(LedgerError::UnknownUser)
    }

    async fn holdings(&self, user_id: Uuid) -> Result<Vec<Holding>, LedgerError> {
        Ok(persistence::list_holdings(&self.pool, user_id).await?)
    }

    async fn buy(&self, user_id: Uuid, order: BuyOrder) -> Result<Transaction, LedgerError> {
        let symbol = normalize_symbol(&order.symbol);
        let mut tx = self.pool.begin().await?;

        let cash = persistence::lock_cash(&mut *tx, user_id)
            .await?
            .ok_or(LedgerError::UnknownUser)?;
        // On error, dropping `tx` rolls back and releases the row lock.
        let total = affordable_total(order.shares, order.price_per_share, cash)?;

        let now = Utc::now();
        persistence::set_cash(&mut *tx, user_id, cash - total).await?;
        persistence::insert_lot(
            &mut *tx,
            Uuid::new_v4(),
            user_id,
            &symbol,
            &order.name,
            order.shares,
            order.price_per_share,
            now,
        )
        .await?;
        let txn = Transaction {
            id: Uuid::new_v4(),
            user_id,
            symbol,
            shares: order.shares,
            price_per_share: order.price_per_share,
            price: total,
            status: TransactionStatus::Bought,
            timestamp: now,
        };
        persistence::insert_transaction(&mut *tx, &txn).await?;
        tx.commit().await?;
        Ok(txn)
    }

    async fn sell(&self, user_id: Uuid, order: SellOrder) -> Result<Transaction, LedgerError> {
        let total = total_cost(order.shares, order.price_per_share)?
            .ok_or(LedgerError::InvalidShares)?;
        let symbol = normalize_symbol(&order.symbol);
        let mut tx = self.pool.begin().await?;

        let cash = persistence::lock_cash(&mut *tx, user_id)
            .await?
            .ok_or(LedgerError::UnknownUser)?;
        let lots = persistence::lock_lots(&mut *tx, user_id, &symbol).await?;
        let plan = consume_lots(&lots, order.shares).map_err(|short| {
            LedgerError::InsufficientShares {
                symbol: symbol.clone(),
                owned: short.owned,
                requested: short.requested,
            }
        })?;

        for step in plan {
            if step.remaining == 0 {
                persistence::delete_lot(&mut *tx, step.lot_id).await?;
            } else {
                persistence::update_lot_shares(&mut *tx, step.lot_id, step.remaining).await?;
            }
        }
        persistence::set_cash(&mut *tx, user_id, cash + total).await?;
        let txn = Transaction {
            id: Uuid::new_v4(),
            user_id,
            symbol,
            shares: -order.shares,
            price_per_share: order.price_per_share,
            price: total,
            status: TransactionStatus::Sold,
            timestamp: Utc::now(),
        };
        persistence::insert_transaction(&mut *tx, &txn).await?;
        tx.commit().await?;
        Ok(txn)
    }

    async fn history(&self, user_id: Uuid) -> Result<Vec<Transaction>, LedgerError> {
        Ok(persistence::list_transactions_for_user(&self.pool, user_id).await?)
    }
}
