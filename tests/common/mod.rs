#![allow(dead_code)]

use bandtrader::domain::account::AccountSnapshot;
use bandtrader::domain::backtest::BacktestConfig;
use bandtrader::domain::error::BandTraderError;
use bandtrader::domain::execution::ExecutionConfig;
use bandtrader::domain::frequency::Frequency;
pub use bandtrader::domain::ohlcv::OhlcvBar;
use bandtrader::domain::order::{Fill, OrderIntent, Side};
use bandtrader::domain::strategy::{StrategyConfig, VenueLimits};
use bandtrader::ports::account_port::AccountPort;
use bandtrader::ports::data_port::DataPort;
use bandtrader::ports::market_port::MarketDataPort;
use bandtrader::ports::order_port::OrderPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, asset: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(asset.to_string(), bars);
        self
    }

    pub fn with_error(mut self, asset: &str, reason: &str) -> Self {
        self.errors.insert(asset.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        asset: &str,
        _frequency: Frequency,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<OhlcvBar>, BandTraderError> {
        if let Some(reason) = self.errors.get(asset) {
            return Err(BandTraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(asset)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.timestamp >= start && b.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_assets(&self, _frequency: Frequency) -> Result<Vec<String>, BandTraderError> {
        let mut assets: Vec<String> = self.data.keys().cloned().collect();
        assets.sort();
        Ok(assets)
    }
}

/// Fixed market view: every bar in `bars` is history, the last one current.
pub struct MockMarket {
    pub bars: Vec<OhlcvBar>,
    pub current_price: f64,
}

impl MockMarket {
    pub fn from_closes(closes: &[f64], current_price: f64) -> Self {
        Self {
            bars: closes
                .iter()
                .enumerate()
                .map(|(i, &c)| make_bar("btc", day(i), c))
                .collect(),
            current_price,
        }
    }
}

impl MarketDataPort for MockMarket {
    fn get_price_window(
        &self,
        _asset: &str,
        count: usize,
        _frequency: Frequency,
    ) -> Result<Vec<OhlcvBar>, BandTraderError> {
        let start = self.bars.len().saturating_sub(count);
        Ok(self.bars[start..].to_vec())
    }

    fn get_current_price(&self, _asset: &str) -> Result<f64, BandTraderError> {
        Ok(self.current_price)
    }
}

/// Account that reports a fixed snapshot and records submitted intents.
pub struct RecordingAccount {
    pub snapshot: AccountSnapshot,
    pub submitted: Vec<OrderIntent>,
    pub reject_with: Option<String>,
}

impl RecordingAccount {
    pub fn new(snapshot: AccountSnapshot) -> Self {
        Self {
            snapshot,
            submitted: Vec::new(),
            reject_with: None,
        }
    }

    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject_with = Some(reason.to_string());
        self
    }
}

impl AccountPort for RecordingAccount {
    fn snapshot(&self) -> AccountSnapshot {
        self.snapshot
    }
}

impl OrderPort for RecordingAccount {
    fn submit(&mut self, asset: &str, intent: OrderIntent) -> Result<Option<Fill>, BandTraderError> {
        self.submitted.push(intent);
        if let Some(reason) = &self.reject_with {
            return Err(BandTraderError::Order {
                reason: reason.clone(),
            });
        }
        let (side, quantity, cash) = match intent {
            OrderIntent::BuyCash(cash) => (Side::Buy, cash / 100.0, cash),
            OrderIntent::SellQuantity(quantity) => (Side::Sell, quantity, quantity * 100.0),
            OrderIntent::None => return Ok(None),
        };
        Ok(Some(Fill {
            asset: asset.to_string(),
            timestamp: day(0),
            side,
            quantity,
            price: 100.0,
            cash,
            commission: 0.0,
        }))
    }
}

pub fn day(offset: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 10, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(offset as i64)
}

pub fn make_bar(asset: &str, timestamp: NaiveDateTime, close: f64) -> OhlcvBar {
    OhlcvBar {
        asset: asset.to_string(),
        timestamp,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10.0,
    }
}

/// Daily bars starting 2016-10-01, one per close.
pub fn bars_from_closes(asset: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(asset, day(i), c))
        .collect()
}

pub fn snapshot(cash: f64, position: f64, net_value: f64, initial_net_value: f64) -> AccountSnapshot {
    AccountSnapshot {
        cash,
        position,
        net_value,
        initial_net_value,
    }
}

pub fn strategy() -> StrategyConfig {
    StrategyConfig::default()
}

pub fn venue() -> VenueLimits {
    VenueLimits::default()
}

/// Frictionless run over the first year of data.
pub fn sample_config(asset: &str) -> BacktestConfig {
    BacktestConfig {
        asset: asset.to_string(),
        frequency: Frequency::Day1,
        start_time: day(0),
        end_time: day(365),
        initial_cash: 10_000.0,
        initial_position: 0.0,
        execution: ExecutionConfig {
            commission: 0.0,
            slippage: 0.0,
        },
    }
}

/// Writes `{asset}_1d.csv` under `dir`.
pub fn write_csv(dir: &std::path::Path, asset: &str, closes: &[f64]) {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for (i, close) in closes.iter().enumerate() {
        content.push_str(&format!(
            "{},{close},{},{},{close},10\n",
            day(i).format("%Y-%m-%d %H:%M:%S"),
            close + 1.0,
            close - 1.0,
        ));
    }
    std::fs::write(dir.join(format!("{asset}_1d.csv")), content).unwrap();
}
