//! Export of strategy scripts and webhook endpoints for alert forwarding.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::database::models::Strategy;
use crate::error::ApiError;
use crate::routes::response::{ok, ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PineScriptExport {
    pub script: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookExport {
    pub webhook_url: String,
}

/// Library strategies first, then marketplace snapshots
fn find_exportable(state: &AppState, id: &str) -> Result<Strategy, ApiError> {
    let id = Uuid::parse_str(id).map_err(|_| ApiError::not_found("Stratégie non trouvée"))?;
    state
        .store
        .get_strategy(id)
        .or_else(|| state.store.find_listing_by_strategy(id).map(|item| item.strategy))
        .ok_or_else(|| ApiError::not_found("Stratégie non trouvée"))
}

/// "RSI Divergence (Copie)" -> "rsi-divergence-copie"
fn file_stem(name: &str) -> String {
    let stem = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");

    if stem.is_empty() { "strategy".to_string() } else { stem }
}

pub async fn export_pinescript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<PineScriptExport>> {
    let strategy = find_exportable(&state, &id)?;

    Ok(ok(PineScriptExport {
        file_name: format!("{}.pine", file_stem(&strategy.name)),
        script: strategy.pine_script,
    }))
}

pub async fn export_webhook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<WebhookExport>> {
    let strategy = find_exportable(&state, &id)?;

    let webhook_url = format!(
        "{}/webhooks/{}/{}",
        state.config.public_base_url.trim_end_matches('/'),
        strategy.id,
        Uuid::new_v4().simple()
    );
    info!("Webhook issued for strategy {}", strategy.id);

    Ok(ok(WebhookExport { webhook_url }))
}

pub fn create_export_routes() -> Router<AppState> {
    Router::new()
        .route("/api/export/pinescript/{id}", get(export_pinescript))
        .route("/api/export/webhook/{id}", post(export_webhook))
}

#[cfg(test)]
mod tests {
    use super::file_stem;
    use crate::routes::test_support::{send, test_app};
    use axum::http::{Method, StatusCode};

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("RSI Divergence Strategy (Copie)"), "rsi-divergence-strategy-copie");
        assert_eq!(file_stem("Stratégie de Scalping IA"), "stratégie-de-scalping-ia");
        assert_eq!(file_stem("***"), "strategy");
    }

    #[tokio::test]
    async fn test_export_library_strategy() {
        let app = test_app();
        let (_, list) = send(&app, Method::GET, "/api/strategies", None, None).await;
        let id = list["data"]["data"][0]["id"].as_str().unwrap();

        let (status, body) = send(&app, Method::GET, &format!("/api/export/pinescript/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["fileName"], "rsi-divergence-strategy.pine");
        assert!(body["data"]["script"].as_str().unwrap().contains("//@version=5"));
    }

    #[tokio::test]
    async fn test_export_marketplace_snapshot() {
        let app = test_app();
        let (_, listings) = send(&app, Method::GET, "/api/marketplace?search=volume", None, None).await;
        let id = listings["data"]["data"][0]["strategy"]["id"].as_str().unwrap();

        let (status, body) = send(&app, Method::GET, &format!("/api/export/pinescript/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["fileName"], "volume-profile-strategy.pine");
    }

    #[tokio::test]
    async fn test_webhook_url() {
        let app = test_app();
        let (_, list) = send(&app, Method::GET, "/api/strategies", None, None).await;
        let id = list["data"]["data"][0]["id"].as_str().unwrap();

        let (status, body) = send(&app, Method::POST, &format!("/api/export/webhook/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        let url = body["data"]["webhookUrl"].as_str().unwrap();
        assert!(url.contains(&format!("/webhooks/{}/", id)), "{}", url);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/export/webhook/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
