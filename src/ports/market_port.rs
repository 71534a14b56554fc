//! Current market view port, read by the host once per bar.

use crate::domain::error::BandTraderError;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::OhlcvBar;

pub trait MarketDataPort {
    /// Up to `count` most recent bars, oldest first. Fewer are returned while
    /// history is still building up.
    fn get_price_window(
        &self,
        asset: &str,
        count: usize,
        frequency: Frequency,
    ) -> Result<Vec<OhlcvBar>, BandTraderError>;

    fn get_current_price(&self, asset: &str) -> Result<f64, BandTraderError>;
}
