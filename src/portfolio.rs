//! Portfolio arithmetic: FIFO lot consumption and valuation at current prices.
//! Testable without HTTP or a database.

use std::collections::HashMap;
use uuid::Uuid;

use crate::types::holding::{Holding, Lot};
use crate::types::money::Cents;

/// How one lot changes when shares are sold. `remaining == 0` means the lot is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotReduction {
    pub lot_id: Uuid,
    pub remaining: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortPosition {
    pub owned: i64,
    pub requested: i64,
}

/// Plan the removal of `shares` from `lots`, oldest lot first.
/// `lots` must already be ordered by purchase time.
pub fn consume_lots(lots: &[Lot], shares: i64) -> Result<Vec<LotReduction>, ShortPosition> {
    let owned: i64 = lots.iter().map(|l| l.shares).sum();
    if shares > owned {
        return Err(ShortPosition {
            owned,
            requested: shares,
        });
    }

    let mut left = shares;
    let mut plan = Vec::new();
    for lot in lots {
        if left == 0 {
            break;
        }
        let take = left.min(lot.shares);
        left -= take;
        plan.push(LotReduction {
            lot_id: lot.id,
            remaining: lot.shares - take,
        });
    }
    Ok(plan)
}

/// Sum lots into one holding per symbol, dropping symbols with nothing left.
/// The name of the most recent lot wins. Output is ordered by symbol.
pub fn aggregate_lots(lots: &[Lot]) -> Vec<Holding> {
    let mut by_symbol: HashMap<&str, Holding> = HashMap::new();
    for lot in lots {
        let entry = by_symbol.entry(&lot.symbol).or_insert_with(|| Holding {
            symbol: lot.symbol.clone(),
            name: lot.name.clone(),
            shares: 0,
        });
        entry.shares += lot.shares;
        entry.name = lot.name.clone();
    }
    let mut holdings: Vec<Holding> = by_symbol.into_values().filter(|h| h.shares > 0).collect();
    holdings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    holdings
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuedHolding {
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    /// `None` when no current quote could be obtained.
    pub price: Option<Cents>,
    pub value: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portfolio {
    pub holdings: Vec<ValuedHolding>,
    pub cash: Cents,
    pub stocks_total: Cents,
    pub total: Cents,
}

/// Value holdings at current prices. Holdings without a price count as zero.
pub fn value_portfolio(
    cash: Cents,
    holdings: &[Holding],
    prices: &HashMap<String, Cents>,
) -> Portfolio {
    let holdings: Vec<ValuedHolding> = holdings
        .iter()
        .map(|h| {
            let price = prices.get(&h.symbol).copied();
            ValuedHolding {
                symbol: h.symbol.clone(),
                name: h.name.clone(),
                shares: h.shares,
                price,
                value: price.map_or(0, |p| p * h.shares),
            }
        })
        .collect();
    let stocks_total = holdings.iter().map(|h| h.value).sum();
    Portfolio {
        holdings,
        cash,
        stocks_total,
        total: cash + stocks_total,
    }
}
