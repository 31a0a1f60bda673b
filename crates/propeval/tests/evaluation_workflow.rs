//! Integration specifications for the evaluation journey.
//!
//! The questionnaire is seeded the way production fills it, through the
//! bulk importer, and submissions then run against that hierarchy through
//! the public service facade and the HTTP router. The scenarios pin down
//! the one property the whole journey hangs on: weights snapshotted at
//! submission time survive any later edit to the questionnaire.

mod common {
    use std::sync::Arc;

    use propeval::auth::{AuthContext, StaticTokenAuthenticator};
    use propeval::evaluation::hierarchy::{
        CategoryWithQuestions, HierarchyService, InMemoryHierarchyStore, LocalizedText,
        PropertyType,
    };
    use propeval::evaluation::import::{BulkImportService, ImportLimits};
    use propeval::evaluation::scoring::AnswerSelection;
    use propeval::evaluation::sessions::{
        EvaluationSessionService, EvaluationSubmission, InMemorySessionStore, PropertyInfo,
    };
    use propeval::evaluation::sheet::SheetRow;

    pub(super) const ADMIN_TOKEN: &str = "admin-token";
    pub(super) const OWNER_TOKEN: &str = "owner-token";
    pub(super) const OTHER_TOKEN: &str = "other-token";
    pub(super) const OWNER_ID: u64 = 7;

    pub(super) type MemorySessionService =
        EvaluationSessionService<InMemorySessionStore, InMemoryHierarchyStore>;

    pub(super) struct EvaluationFixture {
        pub(super) hierarchy: HierarchyService<InMemoryHierarchyStore>,
        pub(super) import: Arc<BulkImportService<InMemoryHierarchyStore>>,
        pub(super) sessions: Arc<MemorySessionService>,
        pub(super) property_type: PropertyType,
    }

    /// One property type whose questionnaire arrives through the bulk
    /// importer: three questions weighted 5, 8 and 6, each topped by a
    /// weight-10 answer, so a best run is worth 190 points.
    pub(super) fn fixture() -> EvaluationFixture {
        let store = Arc::new(InMemoryHierarchyStore::default());
        let hierarchy = HierarchyService::new(store.clone());
        let property_type = hierarchy
            .create_property_type(LocalizedText::new("Apartament", "Apartment"))
            .expect("property type");
        let import = Arc::new(BulkImportService::new(store.clone(), ImportLimits::default()));
        let outcome = import
            .import(questionnaire_rows(property_type.id), false)
            .expect("questionnaire imports");
        assert_eq!(outcome.failed, 0);

        let sessions = Arc::new(EvaluationSessionService::new(
            Arc::new(InMemorySessionStore::default()),
            store,
        ));
        EvaluationFixture {
            hierarchy,
            import,
            sessions,
            property_type,
        }
    }

    fn row(
        property_type_id: u64,
        category: &str,
        question: &str,
        question_weight: u8,
        answer: &str,
        answer_weight: u8,
    ) -> SheetRow {
        SheetRow {
            property_type_id,
            category_name_ro: category.to_string(),
            question_ro: question.to_string(),
            question_weight,
            answer_ro: answer.to_string(),
            answer_weight,
            ..SheetRow::default()
        }
    }

    fn questionnaire_rows(property_type_id: u64) -> Vec<SheetRow> {
        let roof = "Care este starea acoperisului?";
        let cracks = "Exista fisuri vizibile in pereti?";
        let wiring = "Cand a fost refacuta instalatia electrica?";
        vec![
            row(property_type_id, "Structura cladirii", roof, 5, "Foarte buna", 10),
            row(property_type_id, "Structura cladirii", roof, 5, "Necesita reparatii", 3),
            row(property_type_id, "Structura cladirii", cracks, 8, "Nu", 10),
            row(property_type_id, "Structura cladirii", cracks, 8, "Fisuri structurale", 1),
            row(property_type_id, "Instalatii", wiring, 6, "In ultimii 5 ani", 10),
            row(property_type_id, "Instalatii", wiring, 6, "Acum peste 15 ani", 2),
        ]
    }

    /// The highest-weight answer for every question in the tree.
    pub(super) fn best_selections(tree: &[CategoryWithQuestions]) -> Vec<AnswerSelection> {
        tree.iter()
            .flat_map(|entry| entry.questions.iter())
            .filter_map(|question| {
                question
                    .answers
                    .iter()
                    .max_by_key(|answer| answer.weight)
                    .map(|answer| AnswerSelection {
                        question_id: question.question.id,
                        answer_id: answer.id,
                        question_weight: question.question.weight,
                        answer_weight: answer.weight,
                    })
            })
            .collect()
    }

    pub(super) fn submission(
        property_type_id: u64,
        answers: Vec<AnswerSelection>,
    ) -> EvaluationSubmission {
        EvaluationSubmission {
            property_type_id,
            property: PropertyInfo {
                name: "Apartament Pipera".to_string(),
                location: Some("Bucuresti".to_string()),
                surface: Some("72 mp".to_string()),
                floors: None,
                construction_year: Some("2009".to_string()),
            },
            answers,
        }
    }

    pub(super) fn authenticator() -> Arc<StaticTokenAuthenticator> {
        let admin = AuthContext {
            user_id: 1,
            superuser: true,
        };
        let owner = AuthContext {
            user_id: OWNER_ID,
            superuser: false,
        };
        let other = AuthContext {
            user_id: OWNER_ID + 1,
            superuser: false,
        };
        Arc::new(
            StaticTokenAuthenticator::default()
                .with_token(ADMIN_TOKEN, admin)
                .with_token(OWNER_TOKEN, owner)
                .with_token(OTHER_TOKEN, other),
        )
    }
}

mod journey {
    use super::common::*;
    use propeval::evaluation::scoring::ScoreLevel;
    use propeval::evaluation::sheet::{parse_sheet, TemplateKind};

    #[test]
    fn imported_questionnaire_scores_a_full_run() {
        let fixture = fixture();
        let tree = fixture
            .hierarchy
            .property_tree(fixture.property_type.id)
            .expect("tree loads");

        let outcome = fixture
            .sessions
            .submit(OWNER_ID, submission(fixture.property_type.id, best_selections(&tree)))
            .expect("submission scores");

        assert_eq!(outcome.session.total_score, 190);
        assert_eq!(outcome.session.max_possible_score, 190);
        assert_eq!(outcome.session.percentage, 100.0);
        assert_eq!(outcome.session.level, ScoreLevel::Expert);
        assert_eq!(outcome.session.badge, "Property Master");
        assert_eq!(outcome.result.completion_rate, 100.0);

        let structura = outcome
            .result
            .categories
            .iter()
            .find(|category| category.category_name.ro == "Structura cladirii")
            .expect("category breakdown present");
        assert_eq!(structura.score, 130);
        assert_eq!(structura.max_score, 130);
        assert_eq!(structura.total_questions, 2);
    }

    #[test]
    fn partial_runs_report_score_and_completion_separately() {
        let fixture = fixture();
        let tree = fixture
            .hierarchy
            .property_tree(fixture.property_type.id)
            .expect("tree loads");

        // Answer only the roof question, the sole weight-5 one.
        let mut selections = best_selections(&tree);
        selections.retain(|selection| selection.question_weight == 5);
        assert_eq!(selections.len(), 1);

        let outcome = fixture
            .sessions
            .submit(OWNER_ID, submission(fixture.property_type.id, selections))
            .expect("partial submission scores");

        assert_eq!(outcome.session.total_score, 50);
        assert_eq!(outcome.session.max_possible_score, 190);
        assert!((outcome.session.percentage - 100.0 * 50.0 / 190.0).abs() < 1e-9);
        assert_eq!(outcome.session.level, ScoreLevel::Novice);
        assert_eq!(outcome.session.badge, "Beginner");
        assert!((outcome.result.completion_rate - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn later_sheet_edits_never_rewrite_stored_sessions() {
        let fixture = fixture();
        let tree = fixture
            .hierarchy
            .property_tree(fixture.property_type.id)
            .expect("tree loads");
        let stored = fixture
            .sessions
            .submit(OWNER_ID, submission(fixture.property_type.id, best_selections(&tree)))
            .expect("submission scores");
        assert_eq!(stored.session.total_score, 190);

        // Rewrite every question to weight 9 through the export path.
        let download = fixture
            .import
            .generate_sheet(TemplateKind::Export, fixture.property_type.id)
            .expect("export generates")
            .expect("property type exists");
        let mut rows: Vec<_> = parse_sheet(download.bytes.as_slice())
            .expect("export parses")
            .into_iter()
            .map(|entry| entry.row)
            .collect();
        for row in &mut rows {
            row.question_weight = 9;
        }
        fixture
            .import
            .import(rows, true)
            .expect("replace import applies");

        let record = fixture
            .sessions
            .get(stored.session.id)
            .expect("stored session loads");
        assert_eq!(record.session.total_score, 190);
        assert_eq!(record.session.max_possible_score, 190);
        assert_eq!(record.answers[0].question_weight, 5);

        // A fresh run sees the new weights.
        let tree = fixture
            .hierarchy
            .property_tree(fixture.property_type.id)
            .expect("tree reloads");
        let fresh = fixture
            .sessions
            .submit(OWNER_ID, submission(fixture.property_type.id, best_selections(&tree)))
            .expect("fresh submission scores");
        assert_eq!(fresh.session.max_possible_score, 270);
        assert_eq!(fresh.session.total_score, 270);
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use propeval::evaluation::sessions::evaluation_router;
    use serde_json::{json, Value};

    fn build_router(fixture: &EvaluationFixture) -> axum::Router {
        evaluation_router(fixture.sessions.clone(), authenticator())
    }

    async fn request(
        router: &axum::Router,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        use tower::ServiceExt;

        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        let request = match body {
            Some(payload) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router dispatch");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    #[tokio::test]
    async fn the_owner_walks_through_submit_read_and_rename() {
        let fixture = fixture();
        let router = build_router(&fixture);
        let tree = fixture
            .hierarchy
            .property_tree(fixture.property_type.id)
            .expect("tree loads");

        let payload = json!({
            "property_type_id": fixture.property_type.id,
            "property": { "name": "Apartament Pipera", "location": "Bucuresti" },
            "answers": best_selections(&tree),
        });
        let (status, body) = request(
            &router,
            "POST",
            "/api/v1/evaluations",
            OWNER_TOKEN,
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["result"]["total_score"], 190);
        let session_id = body["evaluation_session_id"].as_u64().expect("session id");

        let uri = format!("/api/v1/evaluations/{session_id}");
        let (status, body) = request(&router, "GET", &uri, OWNER_TOKEN, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["property"]["name"], "Apartament Pipera");
        assert_eq!(body["level"], "Expert");
        assert_eq!(body["badge"], "Property Master");
        assert_eq!(body["answers"].as_array().expect("answers").len(), 3);

        let (status, body) = request(&router, "GET", &uri, OTHER_TOKEN, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "evaluation belongs to another user");

        let (status, _) = request(&router, "GET", &uri, ADMIN_TOKEN, None).await;
        assert_eq!(status, StatusCode::OK);

        let patch_uri = format!("/api/v1/evaluations/{session_id}/property");
        let rename = json!({ "name": "Apartament Herastrau" });
        let (status, body) = request(&router, "PATCH", &patch_uri, OWNER_TOKEN, Some(rename)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["property"]["name"], "Apartament Herastrau");
        assert!(body["property"]["location"].is_null());
        assert_eq!(body["total_score"], 190);

        let (status, body) =
            request(&router, "GET", "/api/v1/evaluations", OWNER_TOKEN, None).await;
        assert_eq!(status, StatusCode::OK);
        let sessions = body.as_array().expect("session list");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["id"].as_u64(), Some(session_id));
    }

    #[tokio::test]
    async fn legacy_submissions_wait_for_manual_scoring() {
        let fixture = fixture();
        let router = build_router(&fixture);

        let payload = json!({
            "property_type_id": fixture.property_type.id,
            "property": { "name": "Casa de vacanta" },
            "custom_fields": [ { "custom_field_id": 4, "value": "3 camere" } ],
        });
        let (status, body) = request(
            &router,
            "POST",
            "/api/v1/evaluations/legacy",
            OWNER_TOKEN,
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let session_id = body["evaluation_session_id"].as_u64().expect("session id");

        let uri = format!("/api/v1/evaluations/{session_id}");
        let (status, body) = request(&router, "GET", &uri, OWNER_TOKEN, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["level"], "Pending");
        assert_eq!(body["badge"], "");
        assert_eq!(body["total_score"], 0);
        assert_eq!(body["custom_fields"][0]["value"], "3 camere");
    }
}
