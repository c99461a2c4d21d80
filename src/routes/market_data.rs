use axum::{routing::get, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::database::models::MarketData;
use crate::error::ApiError;
use crate::routes::response::{ok, required, ApiQuery, ApiResponse, ApiResult};
use crate::server::AppState;
use crate::services::market_data::{is_known_symbol, load_market_data, SYMBOLS};

const DEFAULT_TIMEFRAME: &str = "1D";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MarketDataQuery {
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub from: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub to: Option<String>,
}

fn parse_day(value: Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    required(value)
        .map(|day| {
            NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|_| ApiError::bad_request("Date invalide (format attendu: AAAA-MM-JJ)"))
        })
        .transpose()
}

pub async fn list_symbols() -> ApiResponse<Vec<&'static str>> {
    ok(SYMBOLS.to_vec())
}

pub async fn get_market_data(
    ApiQuery(query): ApiQuery<MarketDataQuery>,
) -> ApiResult<ApiResponse<MarketData>> {
    let Some(symbol) = required(query.symbol) else {
        return Err(ApiError::bad_request("Symbole requis"));
    };
    if !is_known_symbol(&symbol) {
        return Err(ApiError::not_found("Symbole non supporté"));
    }

    let from = parse_day(query.from)?;
    let to = parse_day(query.to)?;
    let timeframe = required(query.timeframe).unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string());

    let data = load_market_data(&symbol, &timeframe, from, to)
        .map_err(|e| ApiError::internal("Erreur lors du chargement des données de marché", e))?;
    Ok(ok(data))
}

pub fn create_market_data_routes() -> Router<AppState> {
    Router::new()
        .route("/api/market-data", get(get_market_data))
        .route("/api/market-data/symbols", get(list_symbols))
}
