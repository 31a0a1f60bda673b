use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Request;
use axum::response::Response;
use serde_json::Value;

use crate::auth::{AuthContext, StaticTokenAuthenticator};
use crate::evaluation::hierarchy::{
    hierarchy_router, HierarchyService, HierarchyStore, InMemoryHierarchyStore, LocalizedText,
    PropertyType,
};

pub(super) const ADMIN_TOKEN: &str = "admin-token";
pub(super) const MEMBER_TOKEN: &str = "member-token";

/// One seeded branch: a category holding a weight-5 question with one answer.
pub(super) fn seeded_store() -> (Arc<InMemoryHierarchyStore>, PropertyType) {
    let store = Arc::new(InMemoryHierarchyStore::default());
    let property_type = store
        .insert_property_type(LocalizedText::new("Apartament", "Apartment"))
        .expect("property type inserts");
    let category = store
        .insert_category(
            property_type.id,
            LocalizedText::new("Structura cladirii", "Building structure"),
        )
        .expect("category inserts");
    let question = store
        .insert_question(
            category.id,
            LocalizedText::new("Care este starea acoperisului?", "Roof condition?"),
            5,
        )
        .expect("question inserts");
    store
        .insert_answer(
            question.id,
            LocalizedText::new("Foarte buna", "Very good"),
            10,
        )
        .expect("answer inserts");
    (store, property_type)
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

pub(super) fn hierarchy_router_with(store: Arc<InMemoryHierarchyStore>) -> axum::Router {
    hierarchy_router(Arc::new(HierarchyService::new(store)), authenticator())
}

pub(super) fn post_json(token: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

pub(super) fn get_with(token: &str, uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub(super) fn delete_with(token: &str, uri: &str) -> Request<Body> {
    Request::delete(uri)
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
