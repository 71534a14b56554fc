//! Order execution port.

use crate::domain::error::BandTraderError;
use crate::domain::order::{Fill, OrderIntent};

pub trait OrderPort {
    /// Execute `intent` for `asset`. `Ok(None)` means nothing was traded.
    fn submit(&mut self, asset: &str, intent: OrderIntent) -> Result<Option<Fill>, BandTraderError>;
}
