//! Single-asset account state and equity tracking.

use chrono::NaiveDateTime;

use super::account::AccountSnapshot;
use super::order::Fill;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub asset: String,
    pub cash: f64,
    pub position: f64,
    /// Last price the position was marked at.
    pub mark_price: f64,
    /// Net value at the first mark; fixed afterwards.
    pub initial_net_value: Option<f64>,
    pub fills: Vec<Fill>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(asset: &str, initial_cash: f64, initial_position: f64) -> Self {
        Portfolio {
            asset: asset.to_string(),
            cash: initial_cash,
            position: initial_position,
            mark_price: 0.0,
            initial_net_value: None,
            fills: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// Mark the position at `price`. The first mark fixes the initial net value.
    pub fn mark(&mut self, price: f64) {
        self.mark_price = price;
        if self.initial_net_value.is_none() {
            self.initial_net_value = Some(self.net_value());
        }
    }

    pub fn net_value(&self) -> f64 {
        self.cash + self.position * self.mark_price
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        let net_value = self.net_value();
        AccountSnapshot {
            cash: self.cash,
            position: self.position,
            net_value,
            initial_net_value: self.initial_net_value.unwrap_or(net_value),
        }
    }

    pub fn record_fill(&mut self, fill: Fill) {
        self.fills.push(fill);
    }

    pub fn record_equity(&mut self, timestamp: NaiveDateTime) {
        let equity = self.net_value();
        self.equity_curve.push(EquityPoint { timestamp, equity });
    }
}
