//! Historical bar storage port.

use crate::domain::error::BandTraderError;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDateTime;

pub trait DataPort {
    /// Bars for `asset` at `frequency` within `[start, end]`, oldest first.
    fn fetch_bars(
        &self,
        asset: &str,
        frequency: Frequency,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<OhlcvBar>, BandTraderError>;

    fn list_assets(&self, frequency: Frequency) -> Result<Vec<String>, BandTraderError>;
}
