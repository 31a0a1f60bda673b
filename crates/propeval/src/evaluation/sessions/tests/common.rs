use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Request;
use axum::response::Response;
use serde_json::Value;

use crate::auth::{AuthContext, StaticTokenAuthenticator};
use crate::evaluation::hierarchy::{
    Answer, HierarchyStore, InMemoryHierarchyStore, LocalizedText, PropertyType, Question,
};
use crate::evaluation::scoring::AnswerSelection;
use crate::evaluation::sessions::{
    evaluation_router, EvaluationSessionService, EvaluationSubmission, InMemorySessionStore,
    PropertyInfo,
};

pub(super) const ADMIN_TOKEN: &str = "admin-token";
pub(super) const OWNER_TOKEN: &str = "owner-token";
pub(super) const OTHER_TOKEN: &str = "other-token";

pub(super) const OWNER_ID: u64 = 2;
pub(super) const OTHER_ID: u64 = 3;

/// One seeded questionnaire branch: a single weight-5 question with a
/// weight-10 and a weight-3 answer, so a full run maxes out at 50 points.
pub(super) struct SeededHierarchy {
    pub(super) store: Arc<InMemoryHierarchyStore>,
    pub(super) property_type: PropertyType,
    pub(super) question: Question,
    pub(super) good_answer: Answer,
    pub(super) poor_answer: Answer,
}

pub(super) fn seeded_hierarchy() -> SeededHierarchy {
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
    let good_answer = store
        .insert_answer(
            question.id,
            LocalizedText::new("Foarte buna", "Very good"),
            10,
        )
        .expect("answer inserts");
    let poor_answer = store
        .insert_answer(
            question.id,
            LocalizedText::new("Necesita reparatii", "Needs repairs"),
            3,
        )
        .expect("answer inserts");
    SeededHierarchy {
        store,
        property_type,
        question,
        good_answer,
        poor_answer,
    }
}

pub(super) fn session_service(
    hierarchy: &SeededHierarchy,
    sessions: Arc<InMemorySessionStore>,
) -> EvaluationSessionService<InMemorySessionStore, InMemoryHierarchyStore> {
    EvaluationSessionService::new(sessions, Arc::clone(&hierarchy.store))
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
                OWNER_TOKEN,
                AuthContext {
                    user_id: OWNER_ID,
                    superuser: false,
                },
            )
            .with_token(
                OTHER_TOKEN,
                AuthContext {
                    user_id: OTHER_ID,
                    superuser: false,
                },
            ),
    )
}

pub(super) fn evaluation_router_with(
    hierarchy: &SeededHierarchy,
    sessions: Arc<InMemorySessionStore>,
) -> axum::Router {
    evaluation_router(
        Arc::new(session_service(hierarchy, sessions)),
        authenticator(),
    )
}

pub(super) fn named_property(name: &str) -> PropertyInfo {
    PropertyInfo {
        name: name.to_string(),
        location: None,
        surface: None,
        floors: None,
        construction_year: None,
    }
}

pub(super) fn selection(seeded: &SeededHierarchy, answer: &Answer) -> AnswerSelection {
    AnswerSelection {
        question_id: seeded.question.id,
        answer_id: answer.id,
        question_weight: seeded.question.weight,
        answer_weight: answer.weight,
    }
}

pub(super) fn submission(
    seeded: &SeededHierarchy,
    answers: Vec<AnswerSelection>,
) -> EvaluationSubmission {
    EvaluationSubmission {
        property_type_id: seeded.property_type.id,
        property: named_property("Apartament Pipera"),
        answers,
    }
}

pub(super) fn post_json(token: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

pub(super) fn patch_json(token: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::patch(uri)
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

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
