use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;
use tracing::error;

use crate::auth::{authenticate, AuthContext, Authenticator};
use crate::evaluation::hierarchy::HierarchyStore;

use super::domain::{EvaluationSubmission, LegacySubmission, PropertyInfo};
use super::service::{EvaluationSessionService, SessionServiceError};
use super::store::SessionStore;

/// Shared state for the evaluation session endpoints.
pub struct SessionRouterState<S, H, A> {
    pub service: Arc<EvaluationSessionService<S, H>>,
    pub auth: Arc<A>,
}

impl<S, H, A> Clone for SessionRouterState<S, H, A> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            auth: Arc::clone(&self.auth),
        }
    }
}

/// Router builder exposing evaluation submission and retrieval endpoints.
///
/// Any authenticated user may submit and read their own sessions; reading
/// or editing someone else's requires a superuser.
pub fn evaluation_router<S, H, A>(
    service: Arc<EvaluationSessionService<S, H>>,
    auth: Arc<A>,
) -> Router
where
    S: SessionStore + 'static,
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let state = SessionRouterState { service, auth };
    Router::new()
        .route(
            "/api/v1/evaluations",
            post(submit_evaluation_handler::<S, H, A>).get(list_evaluations_handler::<S, H, A>),
        )
        .route(
            "/api/v1/evaluations/legacy",
            post(submit_legacy_handler::<S, H, A>),
        )
        .route(
            "/api/v1/evaluations/:session_id",
            get(get_evaluation_handler::<S, H, A>),
        )
        .route(
            "/api/v1/evaluations/:session_id/property",
            patch(update_property_handler::<S, H, A>),
        )
        .with_state(state)
}

fn service_error_response(error: SessionServiceError) -> Response {
    let status = match &error {
        SessionServiceError::MissingPropertyName
        | SessionServiceError::InvalidSnapshot { .. } => StatusCode::BAD_REQUEST,
        SessionServiceError::PropertyTypeNotFound(_)
        | SessionServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        SessionServiceError::Store(source) => {
            error!(error = %source, "session storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn owner_or_superuser(context: AuthContext, owner_id: u64) -> bool {
    context.superuser || context.user_id == owner_id
}

fn foreign_session_response() -> Response {
    let payload = json!({ "error": "evaluation belongs to another user" });
    (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_evaluation_handler<S, H, A>(
    State(state): State<SessionRouterState<S, H, A>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<EvaluationSubmission>,
) -> Response
where
    S: SessionStore + 'static,
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };

    match state.service.submit(context.user_id, request) {
        Ok(outcome) => {
            let payload = json!({
                "evaluation_session_id": outcome.session.id,
                "result": outcome.result,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn submit_legacy_handler<S, H, A>(
    State(state): State<SessionRouterState<S, H, A>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<LegacySubmission>,
) -> Response
where
    S: SessionStore + 'static,
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };

    match state.service.submit_legacy(context.user_id, request) {
        Ok(session) => {
            let payload = json!({ "evaluation_session_id": session.id });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_evaluations_handler<S, H, A>(
    State(state): State<SessionRouterState<S, H, A>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };

    match state.service.sessions_for(context.user_id) {
        Ok(sessions) => (StatusCode::OK, axum::Json(sessions)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn get_evaluation_handler<S, H, A>(
    State(state): State<SessionRouterState<S, H, A>>,
    headers: HeaderMap,
    Path(session_id): Path<u64>,
) -> Response
where
    S: SessionStore + 'static,
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };

    match state.service.get(session_id) {
        Ok(record) => {
            if !owner_or_superuser(context, record.session.user_id) {
                return foreign_session_response();
            }
            (StatusCode::OK, axum::Json(record)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn update_property_handler<S, H, A>(
    State(state): State<SessionRouterState<S, H, A>>,
    headers: HeaderMap,
    Path(session_id): Path<u64>,
    axum::Json(request): axum::Json<PropertyInfo>,
) -> Response
where
    S: SessionStore + 'static,
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };

    let record = match state.service.get(session_id) {
        Ok(record) => record,
        Err(error) => return service_error_response(error),
    };
    if !owner_or_superuser(context, record.session.user_id) {
        return foreign_session_response();
    }

    match state.service.update_property_info(session_id, request) {
        Ok(updated) => (StatusCode::OK, axum::Json(updated)).into_response(),
        Err(error) => service_error_response(error),
    }
}
