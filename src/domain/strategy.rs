//! Strategy parameters and venue order limits.

use crate::domain::error::ConfigError;

/// Mean-reversion band parameters, fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    /// Number of bars in the moving average.
    pub window_size: usize,
    /// Buy when the latest price drops below `sma * buy_threshold`.
    pub buy_threshold: f64,
    /// Sell when the latest price rises above `sma * sell_threshold`.
    pub sell_threshold: f64,
    /// Liquidate and stop trading once net value falls below this fraction
    /// of the initial net value.
    pub stop_loss_ratio: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            window_size: 5,
            buy_threshold: 0.9,
            sell_threshold: 1.2,
            stop_loss_ratio: 0.75,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::WindowSize);
        }
        for (name, value) in [
            ("buy_threshold", self.buy_threshold),
            ("sell_threshold", self.sell_threshold),
            ("stop_loss_ratio", self.stop_loss_ratio),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }
        if self.buy_threshold <= 0.0 {
            return Err(ConfigError::BuyThreshold(self.buy_threshold));
        }
        if self.buy_threshold >= self.sell_threshold {
            return Err(ConfigError::ThresholdOrder {
                buy: self.buy_threshold,
                sell: self.sell_threshold,
            });
        }
        if self.stop_loss_ratio <= 0.0 || self.stop_loss_ratio >= 1.0 {
            return Err(ConfigError::StopLossRatio(self.stop_loss_ratio));
        }
        Ok(())
    }
}

/// Minimum order sizes accepted by the venue for the traded asset.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueLimits {
    pub min_order_quantity: f64,
    pub min_order_cash: f64,
}

impl Default for VenueLimits {
    fn default() -> Self {
        VenueLimits {
            min_order_quantity: 0.001,
            min_order_cash: 20.0,
        }
    }
}

impl VenueLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("min_order_quantity", self.min_order_quantity),
            ("min_order_cash", self.min_order_cash),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeLimit { name, value });
            }
        }
        Ok(())
    }
}
