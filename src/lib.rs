//! bandtrader: mean-reversion band strategy with a portfolio stop-loss.
//!
//! Hexagonal architecture: the signal engine and backtest host in [`domain`],
//! port traits in [`ports`], concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
