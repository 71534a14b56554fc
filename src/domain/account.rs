//! Per-bar view of the trading account.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountSnapshot {
    pub cash: f64,
    /// Quantity of the traded asset held.
    pub position: f64,
    /// Cash plus the position marked at the current price.
    pub net_value: f64,
    /// Net value captured when the strategy started; constant for the run.
    pub initial_net_value: f64,
}

impl AccountSnapshot {
    /// `net_value / initial_net_value`, or `None` when there is no positive
    /// initial value to measure against.
    pub fn net_ratio(&self) -> Option<f64> {
        if self.initial_net_value > 0.0 {
            Some(self.net_value / self.initial_net_value)
        } else {
            None
        }
    }
}
