//! Auth routes for registration, login, and user info

use axum::{
    extract::{Extension, State},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::auth::{
    jwt::JwtService,
    middleware::AuthMiddleware,
    models::{AuthUser, LoginRequest, RegisterRequest, TokenResponse},
    password::{hash_password, verify_password},
};
use crate::database::models::User;
use crate::error::ApiError;
use crate::routes::response::{created, non_empty, ok, required, ApiJson, ApiResponse, ApiResult};
use crate::server::AppState;

pub async fn register(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(axum::http::StatusCode, ApiResponse<TokenResponse>)> {
    let (Some(email), Some(password), Some(name)) = (
        required(payload.email),
        non_empty(payload.password),
        required(payload.name),
    ) else {
        return Err(ApiError::bad_request("Tous les champs sont requis"));
    };
    let email = email.to_lowercase();

    if app_state.store.get_user_by_email(&email).is_some() {
        return Err(ApiError::bad_request("Un utilisateur avec cet email existe déjà"));
    }

    let password_hash = hash_password(&password)
        .map_err(|e| ApiError::internal("Erreur lors de la création du compte", e))?;
    let user = User::new(email.clone(), name, password_hash);

    // The check above can race with a concurrent registration; the insert is authoritative
    if !app_state.store.insert_user(user.clone()) {
        return Err(ApiError::bad_request("Un utilisateur avec cet email existe déjà"));
    }

    let token = app_state.jwt_service.create_token(user.id, email)
        .map_err(|e| ApiError::internal("Erreur lors de la création du compte", e))?;

    tracing::info!("Registered user {}", user.id);
    Ok(created(TokenResponse { token, user }))
}

pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<ApiResponse<TokenResponse>> {
    let (Some(email), Some(password)) = (required(payload.email), non_empty(payload.password)) else {
        return Err(ApiError::bad_request("Email et mot de passe requis"));
    };
    let email = email.to_lowercase();

    let invalid_credentials = || ApiError::unauthorized("Email ou mot de passe incorrect");

    let user = app_state.store.get_user_by_email(&email).ok_or_else(invalid_credentials)?;

    let valid = verify_password(&password, &user.password_hash)
        .map_err(|e| ApiError::internal("Erreur lors de la connexion", e))?;
    if !valid {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(invalid_credentials());
    }

    let token = app_state.jwt_service.create_token(user.id, email)
        .map_err(|e| ApiError::internal("Erreur lors de la connexion", e))?;

    Ok(ok(TokenResponse { token, user }))
}

pub async fn profile(
    State(app_state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<ApiResponse<User>> {
    app_state
        .store
        .get_user_by_id(auth_user.id)
        .map(ok)
        .ok_or_else(|| ApiError::not_found("Utilisateur non trouvé"))
}

pub fn create_auth_routes(jwt_service: Arc<JwtService>) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/auth/profile", get(profile))
        .layer(middleware::from_fn_with_state(jwt_service, AuthMiddleware::validate_token));

    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(protected)
}

#[cfg(test)]
mod tests {
    use crate::auth::jwt::JwtService;
    use crate::routes::test_support::{demo_token, send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_register_then_profile() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            Some(json!({ "email": "Trader@Example.com ", "password": "s3cret", "name": "Trader" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["user"]["email"], "trader@example.com");
        assert_eq!(body["data"]["user"]["plan"], "free");
        assert!(body["data"]["user"].get("passwordHash").is_none());

        let token = body["data"]["token"].as_str().unwrap();
        let (status, profile) = send(&app, Method::GET, "/api/auth/profile", None, Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["data"]["name"], "Trader");
    }

    #[tokio::test]
    async fn test_register_existing_email_is_rejected() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            Some(json!({ "email": "demo@tradequantic.ai", "password": "x", "name": "Again" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Un utilisateur avec cet email existe déjà");
    }

    #[tokio::test]
    async fn test_register_requires_all_fields() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            Some(json!({ "email": "a@b.c", "password": "x" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Tous les champs sont requis");
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": "demo@tradequantic.ai", "password": "nope" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Email ou mot de passe incorrect");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": "ghost@tradequantic.ai", "password": "demo123" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let app = test_app();
        let (status, body) = send(&app, Method::POST, "/api/auth/login", Some(json!({})), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email et mot de passe requis");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = test_app();
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();

        let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_demo_login_and_profile() {
        let app = test_app();
        let token = demo_token(&app).await;

        let (status, body) = send(&app, Method::GET, "/api/auth/profile", None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "demo@tradequantic.ai");
        assert_eq!(body["data"]["strategiesUsed"], 1);
    }

    #[tokio::test]
    async fn test_profile_token_errors() {
        let app = test_app();

        let (status, body) = send(&app, Method::GET, "/api/auth/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token d'accès requis");

        let (status, body) = send(&app, Method::GET, "/api/auth/profile", None, Some("garbage")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Token invalide");
    }

    #[tokio::test]
    async fn test_profile_for_unknown_user_is_not_found() {
        let app = test_app();
        let token = JwtService::new("test_secret", 7)
            .create_token(Uuid::new_v4(), "ghost@tradequantic.ai".to_string())
            .unwrap();

        let (status, body) = send(&app, Method::GET, "/api/auth/profile", None, Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Utilisateur non trouvé");
    }
}
