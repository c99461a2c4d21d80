use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{BacktestConfig, BacktestResult};
use crate::error::ApiError;
use crate::routes::response::{ok, ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::server::AppState;
use crate::services::backtest::run_mock_backtest;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryQuery {
    pub strategy_id: Option<Uuid>,
}

/// Run a backtest for a library strategy. The result is placeholder data.
pub async fn run_backtest(
    State(state): State<AppState>,
    ApiJson(config): ApiJson<BacktestConfig>,
) -> ApiResult<ApiResponse<BacktestResult>> {
    if config.symbol.trim().is_empty()
        || config.timeframe.trim().is_empty()
        || config.initial_capital <= 0.0
        || config.commission < 0.0
        || config.slippage < 0.0
    {
        return Err(ApiError::bad_request("Configuration de backtest invalide"));
    }

    if state.store.get_strategy(config.strategy_id).is_none() {
        return Err(ApiError::not_found("Stratégie non trouvée"));
    }

    let result = run_mock_backtest(config)
        .map_err(|e| ApiError::internal("Erreur lors de l'exécution du backtest", e))?;
    info!("Backtest {} recorded for strategy {}", result.id, result.strategy_id);

    state.store.insert_backtest(result.clone());
    Ok(ok(result))
}

pub async fn backtest_history(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<ApiResponse<Vec<BacktestResult>>> {
    Ok(ok(state.store.list_backtests(query.strategy_id)))
}

pub async fn get_backtest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<BacktestResult>> {
    Uuid::parse_str(&id)
        .ok()
        .and_then(|id| state.store.get_backtest(id))
        .map(ok)
        .ok_or_else(|| ApiError::not_found("Backtest non trouvé"))
}

pub fn create_backtest_routes() -> Router<AppState> {
    Router::new()
        .route("/api/backtest/run", post(run_backtest))
        .route("/api/backtest/history", get(backtest_history))
        .route("/api/backtest/{id}", get(get_backtest))
}
