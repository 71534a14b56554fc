//! Signal engine: moving-average band signals with a portfolio stop-loss latch.
//!
//! Each bar is evaluated in a fixed priority order:
//! 1. Stopped out: the latch is set, nothing further happens.
//! 2. Stop-loss: net value below `stop_loss_ratio` of the initial value sets
//!    the latch and liquidates the position.
//! 3. Insufficient history: fewer closes than `window_size`.
//! 4. Band: buy below `sma * buy_threshold`, sell above `sma * sell_threshold`.
//!
//! The engine performs no I/O. It returns an [`OrderIntent`] for the host to
//! execute and narrates every branch through `tracing`.

use tracing::{info, warn};

use crate::domain::account::AccountSnapshot;
use crate::domain::error::ConfigError;
use crate::domain::order::OrderIntent;
use crate::domain::price_window::{Band, PriceWindow};
use crate::domain::strategy::{StrategyConfig, VenueLimits};

/// Mutable engine state. `stop_loss_triggered` is a one-way latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineState {
    pub stop_loss_triggered: bool,
}

impl EngineState {
    pub fn is_stopped_out(&self) -> bool {
        self.stop_loss_triggered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecisionReason {
    /// The stop-loss fired on an earlier bar.
    StoppedOut,
    /// The stop-loss fired on this bar.
    StopLossTriggered,
    InsufficientData,
    BuySignal,
    /// Buy signal without enough cash for the venue minimum.
    InsufficientCash,
    SellSignal,
    /// Sell signal without enough position for the venue minimum.
    InsufficientPosition,
    NoSignal,
}

impl DecisionReason {
    pub const ALL: [DecisionReason; 8] = [
        DecisionReason::StoppedOut,
        DecisionReason::StopLossTriggered,
        DecisionReason::InsufficientData,
        DecisionReason::BuySignal,
        DecisionReason::InsufficientCash,
        DecisionReason::SellSignal,
        DecisionReason::InsufficientPosition,
        DecisionReason::NoSignal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DecisionReason::StoppedOut => "stopped out",
            DecisionReason::StopLossTriggered => "stop-loss triggered",
            DecisionReason::InsufficientData => "insufficient data",
            DecisionReason::BuySignal => "buy signal",
            DecisionReason::InsufficientCash => "insufficient cash",
            DecisionReason::SellSignal => "sell signal",
            DecisionReason::InsufficientPosition => "insufficient position",
            DecisionReason::NoSignal => "no signal",
        }
    }
}

/// Outcome of one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub intent: OrderIntent,
    pub reason: DecisionReason,
    /// Present only when the band was computed on this bar.
    pub band: Option<Band>,
}

impl Decision {
    fn new(intent: OrderIntent, reason: DecisionReason) -> Self {
        Decision {
            intent,
            reason,
            band: None,
        }
    }

    fn with_band(intent: OrderIntent, reason: DecisionReason, band: Band) -> Self {
        Decision {
            intent,
            reason,
            band: Some(band),
        }
    }
}

/// Validate `config` and return a fresh, active state.
pub fn initialize(config: &StrategyConfig) -> Result<EngineState, ConfigError> {
    config.validate()?;
    Ok(EngineState::default())
}

/// Evaluate one bar, updating `state` in place.
pub fn decide(
    state: &mut EngineState,
    config: &StrategyConfig,
    venue: &VenueLimits,
    account: &AccountSnapshot,
    prices: &PriceWindow,
    latest_price: f64,
) -> Decision {
    if state.stop_loss_triggered {
        warn!("stop-loss already triggered, no orders this bar");
        return Decision::new(OrderIntent::None, DecisionReason::StoppedOut);
    }

    if let Some(net_ratio) = account.net_ratio() {
        if net_ratio < config.stop_loss_ratio {
            warn!(
                net_value = account.net_value,
                initial_net_value = account.initial_net_value,
                net_ratio,
                stop_loss_ratio = config.stop_loss_ratio,
                "net value below stop-loss line, liquidating"
            );
            state.stop_loss_triggered = true;
            info!("stop_loss_triggered set");

            let intent = if account.position >= venue.min_order_quantity {
                info!(quantity = account.position, "stop-loss selling entire position");
                OrderIntent::SellQuantity(account.position)
            } else {
                OrderIntent::None
            };
            return Decision::new(intent, DecisionReason::StopLossTriggered);
        }
    }

    let Some(sma) = prices.sma(config.window_size) else {
        warn!(
            bars = prices.len(),
            required = config.window_size,
            "not enough bars, waiting for the next bar"
        );
        return Decision::new(OrderIntent::None, DecisionReason::InsufficientData);
    };

    let band = Band::new(sma, config.buy_threshold, config.sell_threshold);
    info!(
        latest = latest_price,
        sma = band.sma,
        upper = band.upper,
        lower = band.lower,
        "band computed"
    );

    if band.is_below(latest_price) {
        info!("price broke below lower band, buy signal");
        if account.cash >= venue.min_order_cash {
            info!(cash = account.cash, "buying with all available cash");
            Decision::with_band(
                OrderIntent::BuyCash(account.cash),
                DecisionReason::BuySignal,
                band,
            )
        } else {
            info!(cash = account.cash, "not enough cash to place an order");
            Decision::with_band(OrderIntent::None, DecisionReason::InsufficientCash, band)
        }
    } else if band.is_above(latest_price) {
        info!("price broke above upper band, sell signal");
        if account.position >= venue.min_order_quantity {
            info!(quantity = account.position, "selling entire position");
            Decision::with_band(
                OrderIntent::SellQuantity(account.position),
                DecisionReason::SellSignal,
                band,
            )
        } else {
            info!(position = account.position, "not enough position to sell");
            Decision::with_band(
                OrderIntent::None,
                DecisionReason::InsufficientPosition,
                band,
            )
        }
    } else {
        info!("no trading signal, waiting for the next bar");
        Decision::with_band(OrderIntent::None, DecisionReason::NoSignal, band)
    }
}

/// Functional form of [`decide`]: takes the state by value and returns the
/// updated copy alongside the intent.
pub fn on_bar(
    state: EngineState,
    config: &StrategyConfig,
    venue: &VenueLimits,
    account: &AccountSnapshot,
    prices: &PriceWindow,
    latest_price: f64,
) -> (OrderIntent, EngineState) {
    let mut next = state;
    let decision = decide(&mut next, config, venue, account, prices, latest_price);
    (decision.intent, next)
}

/// Owns the parameters and the latch for one run.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: StrategyConfig,
    venue: VenueLimits,
    state: EngineState,
}

impl SignalEngine {
    pub fn new(config: StrategyConfig, venue: VenueLimits) -> Result<Self, ConfigError> {
        let state = initialize(&config)?;
        venue.validate()?;
        Ok(Self {
            config,
            venue,
            state,
        })
    }

    /// Resume from a state saved by the host, e.g. across a restart, so a
    /// fired stop-loss stays fired.
    pub fn with_state(
        config: StrategyConfig,
        venue: VenueLimits,
        state: EngineState,
    ) -> Result<Self, ConfigError> {
        let mut engine = Self::new(config, venue)?;
        engine.state = state;
        Ok(engine)
    }

    pub fn on_bar(
        &mut self,
        account: &AccountSnapshot,
        prices: &PriceWindow,
        latest_price: f64,
    ) -> Decision {
        decide(
            &mut self.state,
            &self.config,
            &self.venue,
            account,
            prices,
            latest_price,
        )
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_stopped_out(&self) -> bool {
        self.state.is_stopped_out()
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn venue(&self) -> &VenueLimits {
        &self.venue
    }
}
