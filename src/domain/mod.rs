//! Core domain types and logic.

pub mod account;
pub mod backtest;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod execution;
pub mod frequency;
pub mod metrics;
pub mod ohlcv;
pub mod order;
pub mod portfolio;
pub mod price_window;
pub mod replay;
pub mod simulated_account;
pub mod strategy;
