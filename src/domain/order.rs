//! Order intents emitted by the engine and fills reported by an executor.

use chrono::NaiveDateTime;
use std::fmt;

/// A request to trade. The executor decides the actual fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderIntent {
    /// Spend this much cash on the asset.
    BuyCash(f64),
    /// Sell this quantity of the asset.
    SellQuantity(f64),
    None,
}

impl OrderIntent {
    pub fn is_none(&self) -> bool {
        matches!(self, OrderIntent::None)
    }
}

impl fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderIntent::BuyCash(amount) => write!(f, "BUY cash={amount}"),
            OrderIntent::SellQuantity(quantity) => write!(f, "SELL quantity={quantity}"),
            OrderIntent::None => write!(f, "NONE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub asset: String,
    pub timestamp: NaiveDateTime,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    /// Cash paid (buy) or received (sell), after commission.
    pub cash: f64,
    pub commission: f64,
}
