use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::money::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Bought,
    Sold,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Bought => "BOUGHT",
            TransactionStatus::Sold => "SOLD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BOUGHT" => Some(TransactionStatus::Bought),
            "SOLD" => Some(TransactionStatus::Sold),
            _ => None,
        }
    }
}

/// Immutable log entry. `shares` is signed: positive when bought, negative when sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: i64,
    pub price_per_share: Cents,
    pub price: Cents,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}
