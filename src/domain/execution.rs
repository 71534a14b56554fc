//! Market-order fill simulation with slippage and commission.
//!
//! Buys spend a cash amount, sells dispose of a quantity. Both fill at the
//! bar's price moved against the trader by `slippage`, and pay `commission`
//! as a fraction of the traded value.

use chrono::NaiveDateTime;

use super::error::BandTraderError;
use super::order::{Fill, OrderIntent, Side};
use super::portfolio::Portfolio;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Fraction of traded value, e.g. 0.002.
    pub commission: f64,
    /// Fractional price impact, e.g. 0.001.
    pub slippage: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission: 0.002,
            slippage: 0.001,
        }
    }
}

pub fn apply_slippage_buy(market_price: f64, slippage: f64) -> f64 {
    market_price * (1.0 + slippage)
}

pub fn apply_slippage_sell(market_price: f64, slippage: f64) -> f64 {
    market_price * (1.0 - slippage)
}

/// Execute `intent` against `portfolio` at `market_price`.
///
/// Returns `Ok(None)` for [`OrderIntent::None`]. Amounts above what the
/// account holds are clamped.
pub fn execute(
    portfolio: &mut Portfolio,
    intent: OrderIntent,
    market_price: f64,
    timestamp: NaiveDateTime,
    config: &ExecutionConfig,
) -> Result<Option<Fill>, BandTraderError> {
    if !market_price.is_finite() || market_price <= 0.0 {
        return Err(BandTraderError::Order {
            reason: format!("invalid market price {market_price}"),
        });
    }

    let fill = match intent {
        OrderIntent::None => return Ok(None),
        OrderIntent::BuyCash(amount) => {
            let spend = amount.min(portfolio.cash);
            if spend.is_nan() || spend <= 0.0 {
                return Err(BandTraderError::Order {
                    reason: format!("buy amount {amount} with cash {}", portfolio.cash),
                });
            }
            let price = apply_slippage_buy(market_price, config.slippage);
            let commission = spend * config.commission;
            let quantity = (spend - commission) / price;

            portfolio.cash -= spend;
            portfolio.position += quantity;

            Fill {
                asset: portfolio.asset.clone(),
                timestamp,
                side: Side::Buy,
                quantity,
                price,
                cash: spend,
                commission,
            }
        }
        OrderIntent::SellQuantity(quantity) => {
            let quantity = quantity.min(portfolio.position);
            if quantity.is_nan() || quantity <= 0.0 {
                return Err(BandTraderError::Order {
                    reason: format!("sell quantity {quantity} with position {}", portfolio.position),
                });
            }
            let price = apply_slippage_sell(market_price, config.slippage);
            let gross = quantity * price;
            let commission = gross * config.commission;
            let proceeds = gross - commission;

            portfolio.position -= quantity;
            portfolio.cash += proceeds;

            Fill {
                asset: portfolio.asset.clone(),
                timestamp,
                side: Side::Sell,
                quantity,
                price,
                cash: proceeds,
                commission,
            }
        }
    };

    portfolio.record_fill(fill.clone());
    Ok(Some(fill))
}
