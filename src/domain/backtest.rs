//! Backtest host: drives the signal engine over replayed bars.
//!
//! Per bar the host marks the account, reads a snapshot and price window
//! through the ports, asks the engine for a decision and submits the intent.
//! Rejected orders are logged and do not feed back into the engine.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::domain::engine::{Decision, DecisionReason, SignalEngine};
use crate::domain::error::BandTraderError;
use crate::domain::execution::ExecutionConfig;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::portfolio::Portfolio;
use crate::domain::price_window::PriceWindow;
use crate::domain::replay::ReplayMarket;
use crate::domain::simulated_account::SimulatedAccount;
use crate::ports::account_port::AccountPort;
use crate::ports::market_port::MarketDataPort;
use crate::ports::order_port::OrderPort;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub asset: String,
    pub frequency: Frequency,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub initial_cash: f64,
    pub initial_position: f64,
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub bars_processed: usize,
    pub decisions: BTreeMap<DecisionReason, usize>,
    /// Timestamp of the bar on which the stop-loss fired, if it did.
    pub stop_loss_at: Option<NaiveDateTime>,
    pub rejected_orders: usize,
    /// Buy-and-hold return of the traded asset over the replayed bars.
    pub benchmark_return: Option<f64>,
}

impl BacktestResult {
    pub fn decision_count(&self, reason: DecisionReason) -> usize {
        self.decisions.get(&reason).copied().unwrap_or(0)
    }
}

/// Outcome of [`process_bar`].
#[derive(Debug, Clone, PartialEq)]
pub struct BarOutcome {
    pub decision: Decision,
    /// `false` when an emitted intent was rejected by the order port.
    pub accepted: bool,
}

/// One engine invocation against the host ports.
pub fn process_bar<M, A>(
    engine: &mut SignalEngine,
    market: &M,
    account: &mut A,
    asset: &str,
    frequency: Frequency,
) -> Result<BarOutcome, BandTraderError>
where
    M: MarketDataPort,
    A: AccountPort + OrderPort,
{
    let snapshot = account.snapshot();
    let bars = market.get_price_window(asset, engine.config().window_size, frequency)?;
    let prices = PriceWindow::from_bars(&bars);
    let latest_price = market.get_current_price(asset)?;

    let decision = engine.on_bar(&snapshot, &prices, latest_price);

    let mut accepted = true;
    if !decision.intent.is_none() {
        match account.submit(asset, decision.intent) {
            Ok(Some(fill)) => info!(
                side = ?fill.side,
                quantity = fill.quantity,
                price = fill.price,
                commission = fill.commission,
                "order filled"
            ),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, intent = %decision.intent, "order rejected");
                accepted = false;
            }
        }
    }

    Ok(BarOutcome { decision, accepted })
}

/// First close to last close. `None` without bars or with a non-positive
/// first close.
pub fn benchmark_return(bars: &[OhlcvBar]) -> Option<f64> {
    let first = bars.first()?.close;
    let last = bars.last()?.close;
    (first > 0.0).then(|| (last - first) / first)
}

pub fn run_backtest(
    bars: Vec<OhlcvBar>,
    engine: &mut SignalEngine,
    config: &BacktestConfig,
) -> Result<BacktestResult, BandTraderError> {
    let benchmark = benchmark_return(&bars);
    let mut market = ReplayMarket::new(&config.asset, config.frequency, bars);
    let mut account = SimulatedAccount::new(
        Portfolio::new(&config.asset, config.initial_cash, config.initial_position),
        config.execution.clone(),
    );

    let mut decisions = BTreeMap::new();
    let mut stop_loss_at = None;
    let mut rejected_orders = 0;
    let mut bars_processed = 0;

    while let Some(bar) = market.advance() {
        let bar = bar.clone();
        account.mark(&bar);

        let outcome = process_bar(engine, &market, &mut account, &config.asset, config.frequency)?;
        *decisions.entry(outcome.decision.reason).or_insert(0) += 1;
        if outcome.decision.reason == DecisionReason::StopLossTriggered {
            stop_loss_at = Some(bar.timestamp);
        }
        if !outcome.accepted {
            rejected_orders += 1;
        }

        account.record_equity();
        bars_processed += 1;
    }

    info!(
        bars = bars_processed,
        fills = account.portfolio().fills.len(),
        stopped_out = engine.is_stopped_out(),
        "backtest finished"
    );

    Ok(BacktestResult {
        portfolio: account.into_portfolio(),
        bars_processed,
        decisions,
        stop_loss_at,
        rejected_orders,
        benchmark_return: benchmark,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::parse_timestamp;
    use crate::domain::order::Side;
    use crate::domain::strategy::{StrategyConfig, VenueLimits};
    use approx::assert_relative_eq;

    fn bars(closes: &[f64]) -> Vec<OhlcvBar> {
        let start = parse_timestamp("2016-10-01").unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                asset: "btc".into(),
                timestamp: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect()
    }

    fn config() -> BacktestConfig {
        BacktestConfig {
            asset: "btc".into(),
            frequency: Frequency::Day1,
            start_time: parse_timestamp("2016-10-01").unwrap(),
            end_time: parse_timestamp("2017-07-01").unwrap(),
            initial_cash: 10000.0,
            initial_position: 0.0,
            execution: ExecutionConfig {
                commission: 0.0,
                slippage: 0.0,
            },
        }
    }

    fn engine() -> SignalEngine {
        SignalEngine::new(StrategyConfig::default(), VenueLimits::default()).unwrap()
    }

    #[test]
    fn warmup_bars_are_insufficient_data() {
        let mut engine = engine();
        let result = run_backtest(bars(&[100.0; 4]), &mut engine, &config()).unwrap();
        assert_eq!(result.bars_processed, 4);
        assert_eq!(result.decision_count(DecisionReason::InsufficientData), 4);
        assert!(result.portfolio.fills.is_empty());
        assert_eq!(result.portfolio.equity_curve.len(), 4);
    }

    #[test]
    fn buys_dip_then_sells_spike() {
        // window ends at the current bar: sma over [100,100,100,100,80] = 96, lower 86.4
        let closes = [100.0, 100.0, 100.0, 100.0, 100.0, 80.0, 100.0, 140.0];
        let mut engine = engine();
        let result = run_backtest(bars(&closes), &mut engine, &config()).unwrap();

        let fills = &result.portfolio.fills;
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].side, Side::Buy);
        assert_eq!(fills[0].price, 80.0);
        assert_eq!(fills[1].side, Side::Sell);
        assert_eq!(fills[1].price, 140.0);
        assert!(result.portfolio.cash > 10000.0);
        assert_eq!(result.decision_count(DecisionReason::BuySignal), 1);
        assert_eq!(result.decision_count(DecisionReason::SellSignal), 1);
        assert!(result.stop_loss_at.is_none());
    }

    #[test]
    fn stop_loss_ends_trading() {
        // buy at 80 (sma 96), then slide until net value < 75% of 10000
        let closes = [100.0, 100.0, 100.0, 100.0, 100.0, 80.0, 70.0, 55.0, 40.0, 30.0, 200.0];
        let mut engine = engine();
        let result = run_backtest(bars(&closes), &mut engine, &config()).unwrap();

        assert!(engine.is_stopped_out());
        assert_eq!(result.decision_count(DecisionReason::StopLossTriggered), 1);
        assert_eq!(result.stop_loss_at, Some(bars(&closes)[7].timestamp));
        assert_eq!(result.decision_count(DecisionReason::StoppedOut), 3);

        let fills = &result.portfolio.fills;
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[1].side, Side::Sell);
        assert_eq!(fills[1].price, 55.0);
        assert_eq!(result.portfolio.position, 0.0);
    }

    #[test]
    fn empty_history_produces_empty_result() {
        let mut engine = engine();
        let result = run_backtest(vec![], &mut engine, &config()).unwrap();
        assert_eq!(result.bars_processed, 0);
        assert!(result.decisions.is_empty());
        assert!(result.benchmark_return.is_none());
    }

    #[test]
    fn benchmark_is_buy_and_hold_of_replayed_bars() {
        let closes = [100.0, 100.0, 100.0, 100.0, 100.0, 80.0, 100.0, 140.0];
        let mut engine = engine();
        let result = run_backtest(bars(&closes), &mut engine, &config()).unwrap();
        assert_relative_eq!(result.benchmark_return.unwrap(), 0.4, epsilon = 1e-12);

        // strategy bought the dip at 80 and sold at 140, beating the benchmark
        let metrics = crate::domain::metrics::Metrics::compute(&result.portfolio);
        assert!(metrics.total_return > result.benchmark_return.unwrap());
    }

    #[test]
    fn benchmark_tracks_losses_after_stop_out() {
        let closes = [100.0, 100.0, 100.0, 100.0, 100.0, 80.0, 70.0, 55.0, 40.0, 30.0, 50.0];
        let mut engine = engine();
        let result = run_backtest(bars(&closes), &mut engine, &config()).unwrap();
        assert_relative_eq!(result.benchmark_return.unwrap(), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn benchmark_single_bar_is_flat() {
        assert_eq!(benchmark_return(&bars(&[42.0])), Some(0.0));
        assert_eq!(benchmark_return(&[]), None);
    }
}
