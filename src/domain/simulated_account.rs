//! Backtest account: a [`Portfolio`] behind the account and order ports.

use chrono::NaiveDateTime;

use crate::domain::account::AccountSnapshot;
use crate::domain::error::BandTraderError;
use crate::domain::execution::{self, ExecutionConfig};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::{Fill, OrderIntent};
use crate::domain::portfolio::Portfolio;
use crate::ports::account_port::AccountPort;
use crate::ports::order_port::OrderPort;

#[derive(Debug, Clone)]
pub struct SimulatedAccount {
    portfolio: Portfolio,
    config: ExecutionConfig,
    timestamp: Option<NaiveDateTime>,
}

impl SimulatedAccount {
    pub fn new(portfolio: Portfolio, config: ExecutionConfig) -> Self {
        Self {
            portfolio,
            config,
            timestamp: None,
        }
    }

    /// Mark the account to `bar`'s close. Orders submitted afterwards fill at
    /// that close.
    pub fn mark(&mut self, bar: &OhlcvBar) {
        self.portfolio.mark(bar.close);
        self.timestamp = Some(bar.timestamp);
    }

    pub fn record_equity(&mut self) {
        if let Some(ts) = self.timestamp {
            self.portfolio.record_equity(ts);
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn into_portfolio(self) -> Portfolio {
        self.portfolio
    }
}

impl AccountPort for SimulatedAccount {
    fn snapshot(&self) -> AccountSnapshot {
        self.portfolio.snapshot()
    }
}

impl OrderPort for SimulatedAccount {
    fn submit(&mut self, asset: &str, intent: OrderIntent) -> Result<Option<Fill>, BandTraderError> {
        if asset != self.portfolio.asset {
            return Err(BandTraderError::Order {
                reason: format!("account trades {}, not {}", self.portfolio.asset, asset),
            });
        }
        let timestamp = self.timestamp.ok_or_else(|| BandTraderError::Order {
            reason: "account has not been marked to a bar".into(),
        })?;
        let price = self.portfolio.mark_price;
        execution::execute(
            &mut self.portfolio,
            intent,
            price,
            timestamp,
            &self.config,
        )
    }
}
