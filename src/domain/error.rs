//! Domain error types.

/// A violated strategy or venue parameter constraint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("window_size must be at least 1")]
    WindowSize,

    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("buy_threshold must be positive, got {0}")]
    BuyThreshold(f64),

    #[error("buy_threshold ({buy}) must be below sell_threshold ({sell})")]
    ThresholdOrder { buy: f64, sell: f64 },

    #[error("stop_loss_ratio must be between 0 and 1 (exclusive), got {0}")]
    StopLossRatio(f64),

    #[error("{name} must be non-negative, got {value}")]
    NegativeLimit { name: &'static str, value: f64 },
}

/// Top-level error type for bandtrader.
#[derive(Debug, thiserror::Error)]
pub enum BandTraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid strategy parameters: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {asset} at {frequency}")]
    NoData { asset: String, frequency: String },

    #[error("order rejected: {reason}")]
    Order { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BandTraderError> for std::process::ExitCode {
    fn from(err: &BandTraderError) -> Self {
        let code: u8 = match err {
            BandTraderError::Io(_) => 1,
            BandTraderError::ConfigParse { .. }
            | BandTraderError::ConfigMissing { .. }
            | BandTraderError::ConfigInvalid { .. }
            | BandTraderError::Config(_) => 2,
            BandTraderError::Order { .. } => 3,
            BandTraderError::Data { .. } | BandTraderError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_top_level() {
        let err: BandTraderError = ConfigError::WindowSize.into();
        assert!(matches!(err, BandTraderError::Config(ConfigError::WindowSize)));
        assert_eq!(
            err.to_string(),
            "invalid strategy parameters: window_size must be at least 1"
        );
    }

    #[test]
    fn threshold_order_message() {
        let err = ConfigError::ThresholdOrder { buy: 1.2, sell: 0.9 };
        assert_eq!(
            err.to_string(),
            "buy_threshold (1.2) must be below sell_threshold (0.9)"
        );
    }

    #[test]
    fn missing_key_message() {
        let err = BandTraderError::ConfigMissing {
            section: "backtest".into(),
            key: "asset".into(),
        };
        assert_eq!(err.to_string(), "missing config key [backtest] asset");
    }
}
