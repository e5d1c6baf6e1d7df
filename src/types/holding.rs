use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::money::Cents;

/// Aggregated position per (user, symbol): the sum of all open lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub shares: i64,
}

/// A single purchase lot in the wallet. `price` is per share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    pub price: Cents,
    pub bought_at: DateTime<Utc>,
}
