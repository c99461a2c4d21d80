//! Strategy library routes: list, fetch, create, update, delete, duplicate.
//!
//! Every route accepts an optional bearer token. When present, new strategies
//! are attributed to the caller; otherwise they go to the demo author.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::{jwt::JwtService, middleware::AuthMiddleware, models::AuthUser};
use crate::database::models::{Author, Paginated, Strategy, StrategyParameter};
use crate::error::ApiError;
use crate::routes::response::{
    created, non_empty, ok, required, ApiJson, ApiQuery, ApiResponse, ApiResult,
};
use crate::server::AppState;

const NOT_FOUND: &str = "Stratégie non trouvée";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListStrategiesQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    /// Comma-separated; a strategy matches if it carries any of them
    pub tags: Option<String>,
    /// Author id
    pub author: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateStrategyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub pine_script: Option<String>,
    pub parameters: Option<Vec<StrategyParameter>>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub price: Option<f64>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateStrategyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub pine_script: Option<String>,
    pub parameters: Option<Vec<StrategyParameter>>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub price: Option<f64>,
}

/// Parse a path id. Anything that is not a UUID cannot name a stored strategy.
pub fn parse_strategy_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(NOT_FOUND))
}

pub async fn list_strategies(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListStrategiesQuery>,
) -> ApiResult<ApiResponse<Paginated<Strategy>>> {
    let mut strategies = state.store.list_strategies();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        strategies.retain(|s| s.matches_search(search));
    }

    if let Some(tags) = query.tags.as_deref().filter(|t| !t.is_empty()) {
        let wanted: Vec<&str> = tags.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
        strategies.retain(|s| wanted.iter().any(|tag| s.tags.iter().any(|t| t == tag)));
    }

    if let Some(author) = query.author.as_deref().filter(|a| !a.is_empty()) {
        strategies.retain(|s| s.author.id == author);
    }

    Ok(ok(Paginated::from_items(
        strategies,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
    )))
}

pub async fn get_strategy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Strategy>> {
    let id = parse_strategy_id(&id)?;
    state
        .store
        .get_strategy(id)
        .map(ok)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn create_strategy(
    State(state): State<AppState>,
    auth_user: Option<Extension<AuthUser>>,
    ApiJson(payload): ApiJson<CreateStrategyRequest>,
) -> ApiResult<(StatusCode, ApiResponse<Strategy>)> {
    let (Some(name), Some(description), Some(pine_script)) = (
        required(payload.name),
        required(payload.description),
        non_empty(payload.pine_script),
    ) else {
        return Err(ApiError::bad_request("Nom, description et code PineScript requis"));
    };

    let author = match auth_user {
        Some(Extension(auth_user)) => match state.store.increment_strategies_used(auth_user.id) {
            Some(user) => Author {
                id: user.id.to_string(),
                name: user.name,
            },
            None => Author::demo(),
        },
        None => Author::demo(),
    };

    let now = Utc::now();
    let strategy = Strategy {
        id: Uuid::new_v4(),
        name,
        description,
        pine_script,
        parameters: payload.parameters.unwrap_or_default(),
        author,
        is_public: payload.is_public.unwrap_or(false),
        price: payload.price,
        downloads: 0,
        rating: 0.0,
        tags: payload.tags.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    state.store.insert_strategy(strategy.clone());
    info!("Created strategy {} for author {}", strategy.id, strategy.author.id);
    Ok(created(strategy))
}

pub async fn update_strategy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateStrategyRequest>,
) -> ApiResult<ApiResponse<Strategy>> {
    let id = parse_strategy_id(&id)?;

    let updated = state.store.update_strategy(id, |strategy| {
        if let Some(name) = required(payload.name) {
            strategy.name = name;
        }
        if let Some(description) = required(payload.description) {
            strategy.description = description;
        }
        if let Some(pine_script) = non_empty(payload.pine_script) {
            strategy.pine_script = pine_script;
        }
        if let Some(parameters) = payload.parameters {
            strategy.parameters = parameters;
        }
        if let Some(tags) = payload.tags {
            strategy.tags = tags;
        }
        if let Some(is_public) = payload.is_public {
            strategy.is_public = is_public;
        }
        if payload.price.is_some() {
            strategy.price = payload.price;
        }
        strategy.updated_at = Utc::now();
    });

    updated.map(ok).ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn delete_strategy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let id = parse_strategy_id(&id)?;
    state
        .store
        .remove_strategy(id)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    info!("Deleted strategy {}", id);
    Ok(ApiResponse::message("Stratégie supprimée avec succès"))
}

pub async fn duplicate_strategy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, ApiResponse<Strategy>)> {
    let id = parse_strategy_id(&id)?;
    let original = state
        .store
        .get_strategy(id)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    let copy = original.duplicate();
    state.store.insert_strategy(copy.clone());
    info!("Duplicated strategy {} into {}", id, copy.id);
    Ok(created(copy))
}

pub fn create_strategy_routes(jwt_service: Arc<JwtService>) -> Router<AppState> {
    Router::new()
        .route("/api/strategies", get(list_strategies).post(create_strategy))
        .route(
            "/api/strategies/{id}",
            get(get_strategy).put(update_strategy).delete(delete_strategy),
        )
        .route("/api/strategies/{id}/duplicate", post(duplicate_strategy))
        .layer(middleware::from_fn_with_state(jwt_service, AuthMiddleware::optional_auth))
}
