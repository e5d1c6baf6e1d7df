//! In-process ledger, used by the integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    BuyOrder, Ledger, LedgerError, SellOrder, affordable_total, normalize_symbol,
    normalize_username, total_cost,
};
use crate::portfolio::{aggregate_lots, consume_lots};
use crate::types::holding::{Holding, Lot};
use crate::types::money::Cents;
use crate::types::transaction::{Transaction, TransactionStatus};
use crate::types::user::User;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    lots: Vec<Lot>,
    transactions: Vec<Transaction>,
}

/// Every operation holds the single write lock for its whole duration.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<State>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: Cents,
    ) -> Result<User, LedgerError> {
        let username = normalize_username(username);
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == username) {
            return Err(LedgerError::DuplicateUsername(username));
        }
        let user = User {
            id: Uuid::new_v4(),
            username,
            password_hash: password_hash.to_string(),
            cash: starting_cash,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, LedgerError> {
        let username = normalize_username(username);
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, LedgerError> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<(), LedgerError> {
        let username = normalize_username(username);
        let mut state = self.state.write().await;
        let user = state
            .users
            .values_mut()
            .find(|u| u.username == username)
            .ok_or(LedgerError::UnknownUser)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn cash(&self, user_id: Uuid) -> Result<Cents, LedgerError> {
        let state = self.state.read().await;
        state
            .users
            .get(&user_id)
            .map(|u| u.cash)
            .ok_or(LedgerError::UnknownUser)
    }

    async fn holdings(&self, user_id: Uuid) -> Result<Vec<Holding>, LedgerError> {
        let state = self.state.read().await;
        let lots: Vec<Lot> = state
            .lots
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        Ok(aggregate_lots(&lots))
    }

    async fn buy(&self, user_id: Uuid, order: BuyOrder) -> Result<Transaction, LedgerError> {
        let symbol = normalize_symbol(&order.symbol);
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&user_id).ok_or(LedgerError::UnknownUser)?;
        let total = affordable_total(order.shares, order.price_per_share, user.cash)?;
        user.cash -= total;

        let now = Utc::now();
        state.lots.push(Lot {
            id: Uuid::new_v4(),
            user_id,
            symbol: symbol.clone(),
            name: order.name,
            shares: order.shares,
            price: order.price_per_share,
            bought_at: now,
        });
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
        state.transactions.push(txn.clone());
        Ok(txn)
    }

    async fn sell(&self, user_id: Uuid, order: SellOrder) -> Result<Transaction, LedgerError> {
        let total = total_cost(order.shares, order.price_per_share)?
            .ok_or(LedgerError::InvalidShares)?;
        let symbol = normalize_symbol(&order.symbol);
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(LedgerError::UnknownUser);
        }

        // Lots are appended in purchase order, so this is already oldest first.
        let lots: Vec<Lot> = state
            .lots
            .iter()
            .filter(|l| l.user_id == user_id && l.symbol == symbol)
            .cloned()
            .collect();
        let plan = consume_lots(&lots, order.shares).map_err(|short| {
            LedgerError::InsufficientShares {
                symbol: symbol.clone(),
                owned: short.owned,
                requested: short.requested,
            }
        })?;

        for step in &plan {
            if let Some(lot) = state.lots.iter_mut().find(|l| l.id == step.lot_id) {
                lot.shares = step.remaining;
            }
        }
        state.lots.retain(|l| l.shares > 0);
        if let Some(user) = state.users.get_mut(&user_id) {
            user.cash += total;
        }

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
        state.transactions.push(txn.clone());
        Ok(txn)
    }

    async fn history(&self, user_id: Uuid) -> Result<Vec<Transaction>, LedgerError> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }
}
