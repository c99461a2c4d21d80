//! # TradeQuantic Server
//!
//! HTTP API behind the TradeQuantic trading-strategy workbench, built with
//! Axum and Tokio. It turns natural-language descriptions into PineScript
//! strategies, keeps a strategy library, runs mock backtests and serves a
//! small marketplace.
//!
//! ## Architecture
//! - `server`: application state, router assembly and the listener
//! - `config`: environment variable configuration
//! - `auth`: JWT issuing and validation, password hashing, middleware
//! - `ai`: template selection and the optional OpenAI-backed generator
//! - `database`: in-memory store, models and demo seed data
//! - `services`: mock backtests and market data
//! - `routes`: HTTP handlers grouped by feature
//!
//! ## Environment Setup
//! Variables are read from the process environment or a `.env` file:
//! ```bash
//! PORT=3001
//! JWT_SECRET=change-me
//! OPENAI_API_KEY=sk-...   # optional, templates are used without it
//! ```
//!
//! ## Health Check
//! ```bash
//! curl http://localhost:3001/ping
//! ```

mod ai;
mod auth;
mod config;
mod database;
mod error;
mod routes;
mod server;
mod services;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    tracing::info!("🏁 Starting TradeQuantic server...");
    tracing::info!("📦 Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("🏗️  Build profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });

    if let Err(e) = server::start(config::CONFIG.clone()).await {
        tracing::error!("❌ Server stopped: {:#}", e);
        std::process::exit(1);
    }
}
