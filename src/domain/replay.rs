//! Bar-by-bar replay of stored history, exposed as a [`MarketDataPort`].
//!
//! The cursor points at the bar currently being processed. Windows end at
//! that bar inclusive and the current price is its close, so the engine
//! never sees bars from the future.

use crate::domain::error::BandTraderError;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::market_port::MarketDataPort;

#[derive(Debug, Clone)]
pub struct ReplayMarket {
    asset: String,
    frequency: Frequency,
    bars: Vec<OhlcvBar>,
    cursor: Option<usize>,
}

impl ReplayMarket {
    pub fn new(asset: &str, frequency: Frequency, bars: Vec<OhlcvBar>) -> Self {
        Self {
            asset: asset.to_string(),
            frequency,
            bars,
            cursor: None,
        }
    }

    /// Move to the next bar and return it, or `None` once history is exhausted.
    pub fn advance(&mut self) -> Option<&OhlcvBar> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.bars.len() {
            self.cursor = Some(self.bars.len());
            return None;
        }
        self.cursor = Some(next);
        self.bars.get(next)
    }

    fn check_asset(&self, asset: &str) -> Result<(), BandTraderError> {
        if asset == self.asset {
            Ok(())
        } else {
            Err(BandTraderError::NoData {
                asset: asset.to_string(),
                frequency: self.frequency.to_string(),
            })
        }
    }

    fn current_index(&self) -> Result<usize, BandTraderError> {
        match self.cursor {
            Some(c) if c < self.bars.len() => Ok(c),
            _ => Err(BandTraderError::Data {
                reason: format!("no current bar for {}", self.asset),
            }),
        }
    }
}

impl MarketDataPort for ReplayMarket {
    fn get_price_window(
        &self,
        asset: &str,
        count: usize,
        frequency: Frequency,
    ) -> Result<Vec<OhlcvBar>, BandTraderError> {
        self.check_asset(asset)?;
        if frequency != self.frequency {
            return Err(BandTraderError::NoData {
                asset: asset.to_string(),
                frequency: frequency.to_string(),
            });
        }
        let end = self.current_index()? + 1;
        let start = end.saturating_sub(count);
        Ok(self.bars[start..end].to_vec())
    }

    fn get_current_price(&self, asset: &str) -> Result<f64, BandTraderError> {
        self.check_asset(asset)?;
        let index = self.current_index()?;
        Ok(self.bars[index].close)
    }
}
