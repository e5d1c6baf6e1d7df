//! The account ledger: users, cash, wallet lots and the transaction log.
//!
//! Handlers only talk to the [`Ledger`] trait. Buy and sell are single atomic
//! operations: the balance/ownership check and every write happen together or
//! not at all.

mod memory;
mod postgres;

pub use memory::MemoryLedger;
pub use postgres::PgLedger;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::types::holding::Holding;
use crate::types::money::Cents;
use crate::types::transaction::Transaction;
use crate::types::user::User;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),
    #[error("unknown user")]
    UnknownUser,
    #[error("insufficient cash: need {required} cents, have {available}")]
    InsufficientCash { required: Cents, available: Cents },
    #[error("insufficient shares of {symbol}: own {owned}, asked to sell {requested}")]
    InsufficientShares {
        symbol: String,
        owned: i64,
        requested: i64,
    },
    #[error("share count must be positive")]
    InvalidShares,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyOrder {
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    pub price_per_share: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellOrder {
    pub symbol: String,
    pub shares: i64,
    pub price_per_share: Cents,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// `username` is lowercased before storage.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: Cents,
    ) -> Result<User, LedgerError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, LedgerError>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, LedgerError>;

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), LedgerError>;

    async fn cash(&self, user_id: Uuid) -> Result<Cents, LedgerError>;

    /// Shares per symbol with a positive total, ordered by symbol.
    async fn holdings(&self, user_id: Uuid) -> Result<Vec<Holding>, LedgerError>;

    async fn buy(&self, user_id: Uuid, order: BuyOrder) -> Result<Transaction, LedgerError>;

    async fn sell(&self, user_id: Uuid, order: SellOrder) -> Result<Transaction, LedgerError>;

    /// Oldest first.
    async fn history(&self, user_id: Uuid) -> Result<Vec<Transaction>, LedgerError>;
}

pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// `Ok(None)` when the total does not fit in an i64; such a total exceeds any balance.
fn total_cost(shares: i64, price_per_share: Cents) -> Result<Option<Cents>, LedgerError> {
    if shares <= 0 {
        return Err(LedgerError::InvalidShares);
    }
    Ok(shares.checked_mul(price_per_share))
}

/// Cost of a purchase checked against the available cash.
fn affordable_total(
    shares: i64,
    price_per_share: Cents,
    cash: Cents,
) -> Result<Cents, LedgerError> {
    match total_cost(shares, price_per_share)? {
        Some(total) if total <= cash => Ok(total),
        total => Err(LedgerError::InsufficientCash {
            required: total.unwrap_or(Cents::MAX),
            available: cash,
        }),
    }
}
