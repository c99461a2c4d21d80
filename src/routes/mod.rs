// # Routes Module
//
// - This module contains all HTTP route handlers for the TradeQuantic server.
// - Routes are organized by functionality into separate submodules, each
//   exposing a `create_*_routes` function merged in `server.rs`.

/// Health check and monitoring endpoints
pub mod health;

/// Registration, login and profile
pub mod auth;

/// Strategy generation from natural language
pub mod ai;

/// Strategy library CRUD
pub mod strategies;

/// Mock backtest runs and history
pub mod backtest;

/// Strategy listings, publishing and purchases
pub mod marketplace;

/// Symbols and price bars for the charts
pub mod market_data;

/// PineScript download and webhook links
pub mod export;

/// Response envelope and body extractor
pub mod response;
