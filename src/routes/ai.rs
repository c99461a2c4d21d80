use axum::{extract::State, routing::post, Router};
use tracing::info;

use crate::ai::{AiResponse, GenerateStrategyRequest, ImproveStrategyRequest};
use crate::error::ApiError;
use crate::routes::response::{ok, required, ApiJson, ApiResponse, ApiResult};
use crate::server::AppState;

/// Generate a strategy draft from a description
pub async fn generate_strategy(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateStrategyRequest>,
) -> ApiResult<ApiResponse<AiResponse>> {
    let Some(prompt) = required(request.prompt) else {
        return Err(ApiError::bad_request("Prompt requis pour générer une stratégie"));
    };

    info!("Generating strategy with {} ({} chars)", state.generator.name(), prompt.len());
    let response = state
        .generator
        .generate(&prompt, request.context.as_ref())
        .await
        .map_err(|e| ApiError::internal("Erreur lors de la génération de la stratégie", e))?;

    Ok(ok(response))
}

/// Revise an existing strategy from feedback
pub async fn improve_strategy(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ImproveStrategyRequest>,
) -> ApiResult<ApiResponse<AiResponse>> {
    let (Some(strategy_id), Some(feedback)) = (required(request.strategy_id), required(request.feedback)) else {
        return Err(ApiError::bad_request("ID de stratégie et feedback requis"));
    };

    let response = state
        .generator
        .improve(&strategy_id, &feedback)
        .await
        .map_err(|e| ApiError::internal("Erreur lors de l'amélioration de la stratégie", e))?;

    Ok(ok(response))
}

pub fn create_ai_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ai/generate-strategy", post(generate_strategy))
        .route("/api/ai/improve-strategy", post(improve_strategy))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::routes::test_support::{send, test_app};
    use crate::server::{create_app, AppState};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_generate_requires_prompt() {
        let app = test_app();
        let (status, body) = send(&app, Method::POST, "/api/ai/generate-strategy", Some(json!({})), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Prompt requis pour générer une stratégie");
    }

    #[tokio::test]
    async fn test_bollinger_prompt_uses_mean_reversion_template() {
        let app = test_app();
        let (_, baseline) = send(
            &app,
            Method::POST,
            "/api/ai/generate-strategy",
            Some(json!({ "prompt": "suivre la tendance" })),
            None,
        )
        .await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/generate-strategy",
            Some(json!({ "prompt": "Achat sur la bande basse de Bollinger" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["strategy"]["name"], "Stratégie de Retour à la Moyenne IA");
        let base = baseline["data"]["confidence"].as_u64().unwrap();
        let confidence = body["data"]["confidence"].as_u64().unwrap();
        assert!(confidence >= base + 10, "{} vs {}", confidence, base);
        assert_eq!(body["data"]["suggestions"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_context_raises_confidence() {
        let app = test_app();
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/ai/generate-strategy",
            Some(json!({
                "prompt": "scalping court terme",
                "context": { "market": "crypto", "timeframe": "5m", "indicators": ["EMA", "RSI"], "riskLevel": "low" }
            })),
            None,
        )
        .await;

        assert_eq!(body["data"]["strategy"]["name"], "Stratégie de Scalping IA");
        assert_eq!(body["data"]["confidence"], 75 + 5 + 5 + 4);
    }

    #[tokio::test]
    async fn test_malformed_context_gives_no_bonus() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/generate-strategy",
            Some(json!({ "prompt": "bollinger", "context": { "riskLevel": 3, "indicators": 7 } })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["strategy"]["name"], "Stratégie de Retour à la Moyenne IA");
        assert_eq!(body["data"]["confidence"], 75 + 10);
    }

    #[tokio::test]
    async fn test_improve_requires_id_and_feedback() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/improve-strategy",
            Some(json!({ "strategyId": "abc" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ID de stratégie et feedback requis");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/improve-strategy",
            Some(json!({ "strategyId": "abc", "feedback": "Moins de faux signaux" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["confidence"], 87);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_internal_error() {
        let mut config = Config::for_tests();
        config.ai.openai_api_key = Some("sk-test".to_string());
        let app = create_app(AppState::new(config).unwrap());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai/generate-strategy",
            Some(json!({ "prompt": "rsi" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Erreur lors de la génération de la stratégie");
    }
}
