use axum::response::Json;
use serde_json::json;

/// Health check endpoint handler.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: `{"status":"pong"}`
///
/// Used by load balancers and container probes to verify the process is up.
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "pong" }))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{send, test_app};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_ping() {
        let (status, body) = send(&test_app(), Method::GET, "/ping", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pong");
    }
}
