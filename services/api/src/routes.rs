use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use propeval::auth::Authenticator;
use propeval::evaluation::hierarchy::{hierarchy_router, HierarchyService, HierarchyStore};
use propeval::evaluation::import::{import_router, BulkImportService};
use propeval::evaluation::sessions::{evaluation_router, EvaluationSessionService, SessionStore};

/// Merge the domain routers with the operational endpoints.
pub(crate) fn with_platform_routes<H, S, A>(
    hierarchy: Arc<HierarchyService<H>>,
    import: Arc<BulkImportService<H>>,
    sessions: Arc<EvaluationSessionService<S, H>>,
    auth: Arc<A>,
) -> axum::Router
where
    H: HierarchyStore + 'static,
    S: SessionStore + 'static,
    A: Authenticator + 'static,
{
    hierarchy_router(hierarchy, Arc::clone(&auth))
        .merge(import_router(import, Arc::clone(&auth)))
        .merge(evaluation_router(sessions, auth))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
