use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::auth::{authenticate, require_superuser, Authenticator};
use crate::evaluation::hierarchy::HierarchyStore;
use crate::evaluation::sheet::{SheetRow, TemplateKind};

use super::{BulkImportError, BulkImportService, SheetDownload};

/// Shared state for the import/export endpoints.
pub struct ImportRouterState<H, A> {
    pub service: Arc<BulkImportService<H>>,
    pub auth: Arc<A>,
}

impl<H, A> Clone for ImportRouterState<H, A> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            auth: Arc::clone(&self.auth),
        }
    }
}

/// Router builder exposing the bulk import and sheet download endpoints.
pub fn import_router<H, A>(service: Arc<BulkImportService<H>>, auth: Arc<A>) -> Router
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    let state = ImportRouterState { service, auth };
    Router::new()
        .route(
            "/api/v1/questions/bulk-import",
            post(bulk_import_handler::<H, A>),
        )
        .route(
            "/api/v1/questions/template",
            get(template_handler::<H, A>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkImportRequest {
    pub(crate) questions: Vec<SheetRow>,
    #[serde(default)]
    pub(crate) replace_existing: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateQuery {
    #[serde(default)]
    pub(crate) kind: Option<String>,
    pub(crate) property_type_id: u64,
}

pub(crate) async fn bulk_import_handler<H, A>(
    State(state): State<ImportRouterState<H, A>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<BulkImportRequest>,
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
        .import(request.questions, request.replace_existing)
    {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(BulkImportError::Validation(failure)) => {
            (StatusCode::BAD_REQUEST, axum::Json(failure)).into_response()
        }
        Err(BulkImportError::Sheet(err)) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "bulk import failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

pub(crate) async fn template_handler<H, A>(
    State(state): State<ImportRouterState<H, A>>,
    headers: HeaderMap,
    Query(query): Query<TemplateQuery>,
) -> Response
where
    H: HierarchyStore + 'static,
    A: Authenticator + 'static,
{
    if let Err(err) = authenticate(state.auth.as_ref(), &headers) {
        return err.into_response();
    }

    let kind = match query.kind.as_deref() {
        None => TemplateKind::Template,
        Some(value) => match TemplateKind::parse(value) {
            Some(kind) => kind,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    axum::Json(json!({ "error": format!("unknown sheet kind '{value}'") })),
                )
                    .into_response()
            }
        },
    };

    match state.service.generate_sheet(kind, query.property_type_id) {
        Ok(Some(download)) => sheet_response(download),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "error": "property type not found" })),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "sheet generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

fn sheet_response(download: SheetDownload) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", download.filename);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response()
}
