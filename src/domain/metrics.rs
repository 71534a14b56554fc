//! Backtest performance summary.

use super::order::Side;
use super::portfolio::{EquityPoint, Portfolio};

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub initial_net_value: f64,
    pub final_net_value: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    /// Longest run of bars spent below a prior equity peak.
    pub max_drawdown_duration: usize,
    pub buys: usize,
    pub sells: usize,
    pub total_commission: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio) -> Self {
        let equity_curve = &portfolio.equity_curve;
        let initial_net_value = portfolio
            .initial_net_value
            .unwrap_or_else(|| portfolio.net_value());
        let final_net_value = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_net_value);

        let total_return = if initial_net_value > 0.0 {
            (final_net_value - initial_net_value) / initial_net_value
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);

        let buys = portfolio.fills.iter().filter(|f| f.side == Side::Buy).count();
        let sells = portfolio.fills.len() - buys;
        let total_commission = portfolio.fills.iter().map(|f| f.commission).sum();

        Metrics {
            initial_net_value,
            final_net_value,
            total_return,
            max_drawdown,
            max_drawdown_duration,
            buys,
            sells,
            total_commission,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut current_duration = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
            current_duration += 1;
            max_duration = max_duration.max(current_duration);
        }
    }

    (max_dd, max_duration)
}
