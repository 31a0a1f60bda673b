use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Request;
use axum::response::Response;
use serde_json::Value;

use crate::auth::{AuthContext, StaticTokenAuthenticator};
use crate::evaluation::hierarchy::{
    HierarchyStore, InMemoryHierarchyStore, LocalizedText, PropertyType,
};
use crate::evaluation::import::{import_router, BulkImportService, ImportLimits};
use crate::evaluation::sheet::SheetRow;

pub(super) const ADMIN_TOKEN: &str = "admin-token";
pub(super) const MEMBER_TOKEN: &str = "member-token";

pub(super) fn seeded_store() -> (Arc<InMemoryHierarchyStore>, PropertyType) {
    let store = Arc::new(InMemoryHierarchyStore::default());
    let property_type = store
        .insert_property_type(LocalizedText::new("Apartament", "Apartment"))
        .expect("property type inserts");
    (store, property_type)
}

pub(super) fn import_service(
    store: Arc<InMemoryHierarchyStore>,
) -> BulkImportService<InMemoryHierarchyStore> {
    BulkImportService::new(store, ImportLimits::default())
}

pub(super) fn authenticator() -> Arc<StaticTokenAuthenticator> {
    Arc::new(
        StaticTokenAuthenticator::default()
            .with_token(
                ADMIN_TOKEN,
                AuthContext {
                    user_id: 1,
                    superuser: true,
                },
            )
            .with_token(
                MEMBER_TOKEN,
                AuthContext {
                    user_id: 7,
                    superuser: false,
                },
            ),
    )
}

pub(super) fn import_router_with(store: Arc<InMemoryHierarchyStore>) -> axum::Router {
    import_router(Arc::new(import_service(store)), authenticator())
}

/// A create-everything row: ids 0, question weight 5.
pub(super) fn new_row(
    property_type_id: u64,
    category: &str,
    question: &str,
    answer: &str,
    answer_weight: u8,
) -> SheetRow {
    SheetRow {
        property_type_id,
        category_name_ro: category.to_string(),
        question_ro: question.to_string(),
        question_weight: 5,
        answer_ro: answer.to_string(),
        answer_weight,
        ..SheetRow::default()
    }
}

pub(super) fn post_import(token: &str, payload: &Value) -> Request<Body> {
    Request::post("/api/v1/questions/bulk-import")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

pub(super) fn get_template(token: &str, uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_raw_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body")
        .to_vec()
}
