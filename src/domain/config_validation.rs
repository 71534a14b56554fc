//! Configuration validation.
//!
//! Validates every config field before an engine is built or a backtest runs.
//! Keys that are absent fall back to their defaults; keys that are present
//! must parse.

use crate::domain::error::{BandTraderError, ConfigError};
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::parse_timestamp;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDateTime;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    validate_window_size(config)?;
    validate_band_parameters(config)?;
    Ok(())
}

pub fn validate_venue_config(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    for key in ["min_order_quantity", "min_order_cash"] {
        if let Some(value) = parse_number(config, "venue", key)? {
            if value < 0.0 {
                return Err(invalid("venue", key, format!("{key} must be non-negative")));
            }
        }
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    validate_backtest_with_asset(config, None)
}

/// Like [`validate_backtest_config`], but `[backtest] asset` may be absent
/// when the caller supplies one.
pub fn validate_backtest_with_asset(
    config: &dyn ConfigPort,
    asset_override: Option<&str>,
) -> Result<(), BandTraderError> {
    match asset_override {
        Some(asset) if !asset.trim().is_empty() => {}
        _ => validate_asset(config)?,
    }
    validate_frequency(config)?;
    validate_times(config)?;
    validate_balances(config)?;
    validate_costs(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: String) -> BandTraderError {
    BandTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

/// `Ok(None)` when the key is absent, an error when present but not a finite number.
fn parse_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, BandTraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(section, key, format!("'{raw}' is not a number"))),
        },
    }
}

fn validate_window_size(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    let Some(raw) = config.get_string("strategy", "window_size") else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(()),
        Ok(_) => Err(invalid(
            "strategy",
            "window_size",
            "window_size must be at least 1".to_string(),
        )),
        Err(_) => Err(invalid(
            "strategy",
            "window_size",
            format!("'{raw}' is not an integer"),
        )),
    }
}

/// Thresholds and stop-loss ratio are checked together by
/// [`StrategyConfig::validate`], with absent keys taken from the defaults.
fn validate_band_parameters(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    let defaults = StrategyConfig::default();
    let candidate = StrategyConfig {
        buy_threshold: parse_number(config, "strategy", "buy_threshold")?
            .unwrap_or(defaults.buy_threshold),
        sell_threshold: parse_number(config, "strategy", "sell_threshold")?
            .unwrap_or(defaults.sell_threshold),
        stop_loss_ratio: parse_number(config, "strategy", "stop_loss_ratio")?
            .unwrap_or(defaults.stop_loss_ratio),
        ..defaults
    };

    candidate.validate().map_err(|err| {
        let key = match &err {
            ConfigError::BuyThreshold(_) => "buy_threshold",
            ConfigError::ThresholdOrder { .. } => "sell_threshold",
            ConfigError::StopLossRatio(_) => "stop_loss_ratio",
            ConfigError::NotFinite { name, .. } | ConfigError::NegativeLimit { name, .. } => *name,
            ConfigError::WindowSize => "window_size",
        };
        invalid("strategy", key, err.to_string())
    })
}

fn validate_asset(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    match config.get_string("backtest", "asset") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BandTraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "asset".to_string(),
        }),
    }
}

fn validate_frequency(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    if let Some(raw) = config.get_string("backtest", "frequency") {
        raw.parse::<Frequency>()
            .map_err(|reason| invalid("backtest", "frequency", reason))?;
    }
    Ok(())
}

fn validate_times(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    let start = config.get_string("backtest", "start_time");
    let end = config.get_string("backtest", "end_time");

    let start = parse_time(start.as_deref(), "start_time")?;
    let end = parse_time(end.as_deref(), "end_time")?;

    if start >= end {
        return Err(invalid(
            "backtest",
            "start_time",
            "start_time must be before end_time".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn parse_time(value: Option<&str>, field: &str) -> Result<NaiveDateTime, BandTraderError> {
    match value {
        None => Err(BandTraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => parse_timestamp(s).ok_or_else(|| {
            invalid(
                "backtest",
                field,
                format!("invalid {field} format, expected YYYY-MM-DD[ HH:MM:SS]"),
            )
        }),
    }
}

fn validate_balances(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    let cash = parse_number(config, "backtest", "initial_cash")?.unwrap_or(100_000.0);
    if cash < 0.0 {
        return Err(invalid(
            "backtest",
            "initial_cash",
            "initial_cash must be non-negative".to_string(),
        ));
    }
    let position = parse_number(config, "backtest", "initial_position")?.unwrap_or(0.0);
    if position < 0.0 {
        return Err(invalid(
            "backtest",
            "initial_position",
            "initial_position must be non-negative".to_string(),
        ));
    }
    if cash == 0.0 && position == 0.0 {
        return Err(invalid(
            "backtest",
            "initial_cash",
            "account starts empty: set initial_cash or initial_position".to_string(),
        ));
    }
    Ok(())
}

fn validate_costs(config: &dyn ConfigPort) -> Result<(), BandTraderError> {
    for key in ["commission", "slippage"] {
        if let Some(value) = parse_number(config, "backtest", key)? {
            if !(0.0..1.0).contains(&value) {
                return Err(invalid("backtest", key, format!("{key} must be in [0, 1)")));
            }
        }
    }
    Ok(())
}
