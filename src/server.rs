//! # Server Module
//!
//! HTTP server setup and route configuration for the TradeQuantic server.

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use axum::http::{HeaderValue, Method, header};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::ai::{StrategyGenerator, generator};
use crate::auth::jwt::JwtService;
use crate::config::Config;
use crate::database::{Store, seed::seed_demo_data};
use crate::routes;
use crate::routes::health::ping;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub jwt_service: Arc<JwtService>,
    pub generator: Arc<dyn StrategyGenerator>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the state from configuration and load the demo records
    pub fn new(config: Config) -> Result<Self> {
        let jwt_service = Arc::new(JwtService::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_days,
        ));
        let generator = generator::from_config(&config.ai)
            .context("Failed to initialize strategy generator")?;

        let store = Store::new();
        seed_demo_data(&store)?;

        Ok(Self {
            store,
            jwt_service,
            generator,
            config: Arc::new(config),
        })
    }
}

/// Assemble every route group behind the CORS layer
pub fn create_app(state: AppState) -> Router {
    let jwt_service = state.jwt_service.clone();

    let cors_origins = &state.config.server.cors_origins;
    let allow_origin = if cors_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(cors_origins.iter().filter_map(|origin| {
            match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            }
        }))
    };

    Router::new()
        .route("/ping", get(ping))
        .merge(routes::auth::create_auth_routes(jwt_service.clone()))
        .merge(routes::ai::create_ai_routes())
        .merge(routes::strategies::create_strategy_routes(jwt_service.clone()))
        .merge(routes::backtest::create_backtest_routes())
        .merge(routes::marketplace::create_marketplace_routes(jwt_service.clone()))
        .merge(routes::market_data::create_market_data_routes())
        .merge(routes::export::create_export_routes())
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(allow_origin)
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PUT,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([
                        header::ORIGIN,
                        header::CONTENT_TYPE,
                        header::ACCEPT,
                        header::AUTHORIZATION,
                    ]),
            ),
        )
        .with_state(state)
}

/// Starts the TradeQuantic HTTP server and serves until the process stops.
pub async fn start(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config)?;
    let generator_name = state.generator.name();
    let app = create_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} - port may already be in use", addr))?;

    tracing::info!("🚀 TradeQuantic server starting...");
    tracing::info!("📡 Listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);
    tracing::info!("🤖 Strategy generation: {}", generator_name);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

#[cfg(test)]
impl AppState {
    pub fn for_tests() -> Self {
        Self::new(Config::for_tests()).expect("test state")
    }
}
