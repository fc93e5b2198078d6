use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use modkit::{not_found, ProblemContext};
use modkit_db::DbHandle;
use serde_json::json;

/// Database handle seen by the health probe; `None` when running without one.
#[derive(Clone, Default)]
pub struct HealthState {
    pub db: Option<Arc<DbHandle>>,
}

/// `GET /api/health`: `{ok: true}`, or 500 with the database error.
pub async fn health_check(Extension(state): Extension<HealthState>) -> impl IntoResponse {
    let Some(db) = state.db else {
        return (StatusCode::OK, Json(json!({ "ok": true })));
    };
    match db.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
        }
    }
}

/// Fallback for unmatched routes.
pub async fn route_not_found(ctx: ProblemContext) -> impl IntoResponse {
    let detail = format!("No route for {}", ctx.instance);
    modkit::ProblemResponse(ctx.apply(not_found(detail).0.with_code("NOT_FOUND")))
}
