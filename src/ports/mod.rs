//! Port traits the engine's host is built against.

pub mod account_port;
pub mod config_port;
pub mod data_port;
pub mod market_port;
pub mod order_port;
