//! # Services Module
//!
//! Business logic behind the route handlers that is not a plain store lookup.

pub mod backtest;
pub mod market_data;
