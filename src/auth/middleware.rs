//! Authentication Middleware
//!
//! Axum middleware for JWT token validation and user authentication.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{jwt::JwtService, models::AuthUser};
use crate::error::ApiError;

/// Authentication middleware that validates JWT tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Reject the request unless it carries a valid bearer token.
    ///
    /// Missing token is 401, a token that fails validation is 403.
    pub async fn validate_token(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        let token = match bearer_token(req.headers()) {
            Some(token) => token,
            None => {
                tracing::warn!("[AuthMiddleware] Missing bearer token on {} {}", req.method(), req.uri());
                return Err(ApiError::unauthorized("Token d'accès requis"));
            }
        };

        let claims = match jwt_service.decode_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("[AuthMiddleware] JWT validation failed: {:#}", e);
                return Err(ApiError::forbidden("Token invalide"));
            }
        };

        tracing::debug!("[AuthMiddleware] Authenticated sub={}", claims.sub);
        req.extensions_mut().insert(AuthUser {
            id: claims.sub,
            email: claims.email,
        });

        Ok(next.run(req).await)
    }

    /// Optional authentication - doesn't fail if no token is provided
    pub async fn optional_auth(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Response {
        let auth_user = bearer_token(req.headers())
            .and_then(|token| jwt_service.decode_claims(token).ok())
            .map(|claims| AuthUser {
                id: claims.sub,
                email: claims.email,
            });

        if let Some(auth_user) = auth_user {
            req.extensions_mut().insert(auth_user);
        }

        next.run(req).await
    }
}

/// Token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }
}
