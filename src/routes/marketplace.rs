//! Marketplace routes: browse listings, publish a library strategy, purchase.
//!
//! No payment is processed; a purchase only records the sale and hands back
//! the export link.

use axum::{
    extract::{Extension, State},
    middleware,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::{jwt::JwtService, middleware::AuthMiddleware, models::AuthUser};
use crate::database::models::{MarketplaceItem, Paginated, Seller};
use crate::error::ApiError;
use crate::routes::response::{ok, required, ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Popularity,
    Price,
    Rating,
    Recent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketplaceQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    /// Matched case-insensitively against the strategy tags
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<SortBy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublishRequest {
    pub strategy_id: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub strategy_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub download_url: String,
}

fn sort_listings(items: &mut [MarketplaceItem], sort_by: SortBy) {
    match sort_by {
        SortBy::Popularity => items.sort_by(|a, b| b.sales.cmp(&a.sales)),
        SortBy::Price => items.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortBy::Rating => items.sort_by(|a, b| b.strategy.rating.total_cmp(&a.strategy.rating)),
        SortBy::Recent => items.sort_by(|a, b| b.strategy.created_at.cmp(&a.strategy.created_at)),
    }
}

pub async fn list_marketplace(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MarketplaceQuery>,
) -> ApiResult<ApiResponse<Paginated<MarketplaceItem>>> {
    let mut items = state.store.list_listings();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        items.retain(|item| item.strategy.matches_search(search));
    }
    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        items.retain(|item| item.strategy.tags.iter().any(|tag| tag.eq_ignore_ascii_case(category)));
    }
    if let Some(min_price) = query.min_price {
        items.retain(|item| item.price >= min_price);
    }
    if let Some(max_price) = query.max_price {
        items.retain(|item| item.price <= max_price);
    }

    sort_listings(&mut items, query.sort_by.unwrap_or_default());

    Ok(ok(Paginated::from_items(
        items,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
    )))
}

/// List one of the caller's own strategies for sale
pub async fn publish_strategy(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<PublishRequest>,
) -> ApiResult<ApiResponse<MarketplaceItem>> {
    let (Some(strategy_id), Some(price)) = (required(request.strategy_id), request.price) else {
        return Err(ApiError::bad_request("ID de stratégie et prix requis"));
    };
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::bad_request("Prix invalide"));
    }

    let strategy_id = Uuid::parse_str(&strategy_id)
        .map_err(|_| ApiError::not_found("Stratégie non trouvée"))?;
    let strategy = state
        .store
        .get_strategy(strategy_id)
        .ok_or_else(|| ApiError::not_found("Stratégie non trouvée"))?;

    if strategy.author.id != auth_user.id.to_string() {
        return Err(ApiError::forbidden("Vous ne pouvez publier que vos propres stratégies"));
    }

    let now = chrono::Utc::now();
    let mut snapshot = strategy;
    snapshot.is_public = true;
    snapshot.price = Some(price);
    snapshot.updated_at = now;

    let item = MarketplaceItem {
        id: Uuid::new_v4(),
        seller: Seller {
            id: snapshot.author.id.clone(),
            name: snapshot.author.name.clone(),
            rating: 0.0,
            sales: 0,
        },
        strategy: snapshot,
        price,
        sales: 0,
        reviews: Vec::new(),
        featured: false,
    };

    if !state.store.insert_listing(item.clone()) {
        return Err(ApiError::bad_request("Stratégie déjà publiée"));
    }

    state.store.update_strategy(strategy_id, |s| {
        s.is_public = true;
        s.price = Some(price);
        s.updated_at = now;
    });

    info!("Strategy {} published at {}", strategy_id, price);
    Ok(ok(item))
}

pub async fn purchase_strategy(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> ApiResult<ApiResponse<PurchaseResponse>> {
    let Some(strategy_id) = required(request.strategy_id) else {
        return Err(ApiError::bad_request("ID de stratégie requis"));
    };

    let unavailable = || ApiError::not_found("Stratégie non disponible sur le marketplace");
    let strategy_id = Uuid::parse_str(&strategy_id).map_err(|_| unavailable())?;

    state.store.record_sale(strategy_id).ok_or_else(unavailable)?;
    state.store.update_strategy(strategy_id, |s| s.downloads += 1);

    info!("User {} purchased strategy {}", auth_user.id, strategy_id);
    Ok(ok(PurchaseResponse {
        download_url: format!(
            "{}/api/export/pinescript/{}",
            state.config.public_base_url.trim_end_matches('/'),
            strategy_id
        ),
    }))
}

pub fn create_marketplace_routes(jwt_service: Arc<JwtService>) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/marketplace/publish", post(publish_strategy))
        .route("/api/marketplace/purchase", post(purchase_strategy))
        .layer(middleware::from_fn_with_state(jwt_service, AuthMiddleware::validate_token));

    Router::new()
        .route("/api/marketplace", get(list_marketplace))
        .merge(protected)
}
