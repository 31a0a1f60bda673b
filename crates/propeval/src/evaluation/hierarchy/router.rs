use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::auth::{authenticate, require_superuser, Authenticator};

use super::domain::LocalizedText;
use super::service::{HierarchyService, HierarchyServiceError};
use super::store::HierarchyStore;

/// Shared state for the hierarchy admin endpoints.
pub struct HierarchyRouterState<H, A> {
    pub service: Arc<HierarchyService<H>>,
    pub auth: Arc<A>,
}

impl<H, A> Clone for HierarchyRouterState<H, A> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            auth: Arc::clone(&self.auth),
        }
    }
}

/// Router builder exposing hierarchy administration endpoints.
pub fn hierarchy_router<H, A>(service: Arc<HierarchyService<H>>, auth: Arc<A>) -> Router
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let state = HierarchyRouterState { service, auth };
    Router::new()
        .route(
            "/api/v1/property-types",
            post(create_property_type_handler::<H, A>).get(list_property_types_handler::<H, A>),
        )
        .route(
            "/api/v1/property-types/:property_type_id",
            delete(delete_property_type_handler::<H, A>),
        )
        .route(
            "/api/v1/property-types/:property_type_id/tree",
            get(property_tree_handler::<H, A>),
        )
        .route("/api/v1/categories", post(create_category_handler::<H, A>))
        .route(
            "/api/v1/categories/:category_id",
            delete(delete_category_handler::<H, A>),
        )
        .route("/api/v1/questions", post(create_question_handler::<H, A>))
        .route("/api/v1/answers", post(create_answer_handler::<H, A>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePropertyTypeRequest {
    pub(crate) name_ro: String,
    #[serde(default)]
    pub(crate) name_en: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateCategoryRequest {
    pub(crate) property_type_id: u64,
    pub(crate) name_ro: String,
    #[serde(default)]
    pub(crate) name_en: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateQuestionRequest {
    pub(crate) category_id: u64,
    pub(crate) text_ro: String,
    #[serde(default)]
    pub(crate) text_en: String,
    pub(crate) weight: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateAnswerRequest {
    pub(crate) question_id: u64,
    pub(crate) text_ro: String,
    #[serde(default)]
    pub(crate) text_en: String,
    pub(crate) weight: u8,
}

fn service_error_response(error: HierarchyServiceError) -> Response {
    let status = match &error {
        HierarchyServiceError::BlankText(_) | HierarchyServiceError::WeightOutOfRange(_) => {
            StatusCode::BAD_REQUEST
        }
        HierarchyServiceError::PropertyTypeNotFound(_)
        | HierarchyServiceError::CategoryNotFound(_)
        | HierarchyServiceError::QuestionNotFound(_) => StatusCode::NOT_FOUND,
        HierarchyServiceError::PropertyTypeInUse { .. }
        | HierarchyServiceError::CategoryInUse { .. } => StatusCode::CONFLICT,
        HierarchyServiceError::Store(source) => {
            error!(error = %source, "hierarchy storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn create_property_type_handler<H, A>(
    State(state): State<HierarchyRouterState<H, A>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreatePropertyTypeRequest>,
) -> Response
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = require_superuser(&context) {
        return err.into_response();
    }

    match state
        .service
        .create_property_type(LocalizedText::new(request.name_ro, request.name_en))
    {
        Ok(property_type) => (StatusCode::CREATED, axum::Json(property_type)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_property_types_handler<H, A>(
    State(state): State<HierarchyRouterState<H, A>>,
    headers: HeaderMap,
) -> Response
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    if let Err(err) = authenticate(state.auth.as_ref(), &headers) {
        return err.into_response();
    }

    match state.service.list_property_types() {
        Ok(types) => (StatusCode::OK, axum::Json(types)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn delete_property_type_handler<H, A>(
    State(state): State<HierarchyRouterState<H, A>>,
    headers: HeaderMap,
    Path(property_type_id): Path<u64>,
) -> Response
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = require_superuser(&context) {
        return err.into_response();
    }

    match state.service.delete_property_type(property_type_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn property_tree_handler<H, A>(
    State(state): State<HierarchyRouterState<H, A>>,
    headers: HeaderMap,
    Path(property_type_id): Path<u64>,
) -> Response
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    if let Err(err) = authenticate(state.auth.as_ref(), &headers) {
        return err.into_response();
    }

    match state.service.property_tree(property_type_id) {
        Ok(tree) => (StatusCode::OK, axum::Json(tree)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn create_category_handler<H, A>(
    State(state): State<HierarchyRouterState<H, A>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateCategoryRequest>,
) -> Response
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = require_superuser(&context) {
        return err.into_response();
    }

    match state.service.create_category(
        request.property_type_id,
        LocalizedText::new(request.name_ro, request.name_en),
    ) {
        Ok(category) => (StatusCode::CREATED, axum::Json(category)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn delete_category_handler<H, A>(
    State(state): State<HierarchyRouterState<H, A>>,
    headers: HeaderMap,
    Path(category_id): Path<u64>,
) -> Response
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = require_superuser(&context) {
        return err.into_response();
    }

    match state.service.delete_category(category_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn create_question_handler<H, A>(
    State(state): State<HierarchyRouterState<H, A>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateQuestionRequest>,
) -> Response
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = require_superuser(&context) {
        return err.into_response();
    }

    match state.service.create_question(
        request.category_id,
        LocalizedText::new(request.text_ro, request.text_en),
        request.weight,
    ) {
        Ok(question) => (StatusCode::CREATED, axum::Json(question)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn create_answer_handler<H, A>(
    State(state): State<HierarchyRouterState<H, A>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateAnswerRequest>,
) -> Response
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let context = match authenticate(state.auth.as_ref(), &headers) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = require_superuser(&context) {
        return err.into_response();
    }

    match state.service.create_answer(
        request.question_id,
        LocalizedText::new(request.text_ro, request.text_en),
        request.weight,
    ) {
        Ok(answer) => (StatusCode::CREATED, axum::Json(answer)).into_response(),
        Err(error) => service_error_response(error),
    }
}
