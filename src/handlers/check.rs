// handlers/check.rs - GET /v1/health

use axum::{extract::Request, http::StatusCode};
use serde_json::json;

use crate::handlers::AppState;
use crate::web::{respond, Outcome, RequestScope};

/// GET /v1/health - reports whether the database answers a query
pub async fn health(state: AppState, _scope: RequestScope, _req: Request) -> Outcome {
    match state.db.status_check().await {
        Ok(()) => respond(&json!({ "status": "OK" }), StatusCode::OK),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            respond(&json!({ "status": "db not ready" }), StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
