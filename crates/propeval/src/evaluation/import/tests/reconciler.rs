use std::sync::Arc;

use super::common::*;
use crate::evaluation::hierarchy::{HierarchyStore, LocalizedText};
use crate::evaluation::import::ReconcileItemKind;
use crate::evaluation::sheet::SheetRow;

#[test]
fn zero_id_rows_create_the_full_hierarchy() {
    let (store, property_type) = seeded_store();
    let service = import_service(Arc::clone(&store));

    let rows = vec![
        new_row(property_type.id, "Structura", "Stare acoperis?", "Foarte buna", 10),
        new_row(property_type.id, "Structura", "Stare acoperis?", "Necesita reparatii", 3),
        new_row(property_type.id, "Instalatii", "Stare tevi?", "Buna", 7),
    ];
    let outcome = service.import(rows, false).expect("batch applies");

    assert_eq!(outcome.categories_created, 2);
    assert_eq!(outcome.questions_created, 2);
    assert_eq!(outcome.answers_created, 3);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.rows_dropped, 0);

    let categories = store.categories_of(property_type.id).expect("listing");
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name.ro, "Structura");

    let questions = store.questions_of(categories[0].id).expect("listing");
    assert_eq!(questions.len(), 1);
    assert_eq!(store.answers_of(questions[0].id).expect("listing").len(), 2);

    let category_key = format!("{}|Structura", property_type.id);
    assert_eq!(
        outcome.id_mappings.categories.get(&category_key),
        Some(&categories[0].id)
    );
    let question_key = format!("{}|Stare acoperis?", categories[0].id);
    assert_eq!(
        outcome.id_mappings.questions.get(&question_key),
        Some(&questions[0].id)
    );
}

#[test]
fn answer_rows_are_never_deduplicated() {
    let (store, property_type) = seeded_store();
    let service = import_service(Arc::clone(&store));

    let row = new_row(property_type.id, "Structura", "Stare acoperis?", "Buna", 7);
    let outcome = service.import(vec![row.clone(), row], false).expect("batch applies");

    assert_eq!(outcome.categories_created, 1);
    assert_eq!(outcome.questions_created, 1);
    assert_eq!(outcome.answers_created, 2);

    let categories = store.categories_of(property_type.id).expect("listing");
    let questions = store.questions_of(categories[0].id).expect("listing");
    let answers = store.answers_of(questions[0].id).expect("listing");
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].text.ro, answers[1].text.ro);
}

#[test]
fn nonzero_ids_rewrite_records_only_with_replace() {
    let (store, property_type) = seeded_store();
    let category = store
        .insert_category(property_type.id, LocalizedText::new("Structura", "Structure"))
        .expect("seed category");
    let question = store
        .insert_question(category.id, LocalizedText::new("Stare acoperis?", ""), 5)
        .expect("seed question");
    let answer = store
        .insert_answer(question.id, LocalizedText::new("Buna", ""), 7)
        .expect("seed answer");
    let service = import_service(Arc::clone(&store));

    let row = SheetRow {
        property_type_id: property_type.id,
        category_id: category.id,
        category_name_ro: "Structura cladirii".to_string(),
        question_id: question.id,
        question_ro: "Care este starea acoperisului?".to_string(),
        question_weight: 9,
        answer_id: answer.id,
        answer_ro: "Excelenta".to_string(),
        answer_weight: 10,
        ..SheetRow::default()
    };

    let untouched = service.import(vec![row.clone()], false).expect("applies");
    assert_eq!(untouched.categories_updated, 0);
    assert_eq!(untouched.answers_updated, 0);
    let stored = store.fetch_category(category.id).expect("fetch").expect("present");
    assert_eq!(stored.name.ro, "Structura");
    // The mapping still resolves so later phases can link against the id.
    assert_eq!(
        untouched
            .id_mappings
            .categories
            .get(&format!("{}|Structura cladirii", property_type.id)),
        Some(&category.id)
    );

    let replaced = service.import(vec![row.clone()], true).expect("applies");
    assert_eq!(replaced.categories_updated, 1);
    assert_eq!(replaced.questions_updated, 1);
    assert_eq!(replaced.answers_updated, 1);
    assert_eq!(replaced.categories_created, 0);

    let stored = store.fetch_category(category.id).expect("fetch").expect("present");
    assert_eq!(stored.name.ro, "Structura cladirii");
    let stored = store.fetch_question(question.id).expect("fetch").expect("present");
    assert_eq!(stored.weight, 9);
    let stored = store.fetch_answer(answer.id).expect("fetch").expect("present");
    assert_eq!(stored.text.ro, "Excelenta");
    assert_eq!(stored.weight, 10);

    // Re-running the same replace import settles into the same state.
    let again = service.import(vec![row], true).expect("applies");
    assert_eq!(again.categories_updated, 1);
    assert_eq!(again.answers_created, 0);
    assert_eq!(store.categories_of(property_type.id).expect("listing").len(), 1);
    assert_eq!(store.answers_of(question.id).expect("listing").len(), 1);
}

#[test]
fn missing_category_id_fails_the_row_but_not_the_batch() {
    let (store, property_type) = seeded_store();
    let service = import_service(Arc::clone(&store));

    let orphan = SheetRow {
        property_type_id: property_type.id,
        category_id: 5,
        category_name_ro: "Fantoma".to_string(),
        question_ro: "Exista?".to_string(),
        question_weight: 4,
        answer_ro: "Nu".to_string(),
        answer_weight: 2,
        ..SheetRow::default()
    };
    let healthy = new_row(property_type.id, "Reala", "Stare acoperis?", "Buna", 7);

    let outcome = service
        .import(vec![orphan, healthy], true)
        .expect("batch still applies");

    assert!(outcome.failed >= 1);
    assert_eq!(outcome.details[0].kind, ReconcileItemKind::Category);
    assert_eq!(outcome.details[0].error, "Category ID 5 not found");

    let serialized = serde_json::to_value(&outcome.details[0]).expect("serializes");
    assert_eq!(serialized["type"], "category");
    assert_eq!(serialized["name"], "Fantoma");

    // The orphan is dropped from question grouping and surfaces again as an
    // unresolvable answer row.
    assert_eq!(outcome.rows_dropped, 1);
    assert!(outcome
        .details
        .iter()
        .any(|failure| failure.kind == ReconcileItemKind::Answer
            && failure.error == "Category not found"));

    // The independent row is untouched by the neighbor's failure.
    assert_eq!(outcome.categories_created, 1);
    assert_eq!(outcome.questions_created, 1);
    assert_eq!(outcome.answers_created, 1);
    let categories = store.categories_of(property_type.id).expect("listing");
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name.ro, "Reala");
}

#[test]
fn repeating_a_zero_id_import_duplicates_content() {
    let (store, property_type) = seeded_store();
    let service = import_service(Arc::clone(&store));

    let rows = vec![new_row(property_type.id, "Structura", "Stare acoperis?", "Buna", 7)];
    service.import(rows.clone(), false).expect("first run");
    service.import(rows, false).expect("second run");

    // Nothing dedupes new content by name, so each run creates a fresh tree.
    let categories = store.categories_of(property_type.id).expect("listing");
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name.ro, categories[1].name.ro);
}

#[test]
fn unresolved_question_rows_fail_in_the_answer_phase() {
    let (store, property_type) = seeded_store();
    let service = import_service(Arc::clone(&store));

    let row = SheetRow {
        property_type_id: property_type.id,
        category_name_ro: "Structura".to_string(),
        question_id: 404,
        question_ro: "Lipseste?".to_string(),
        question_weight: 5,
        answer_ro: "Da".to_string(),
        answer_weight: 3,
        ..SheetRow::default()
    };
    let outcome = service.import(vec![row], true).expect("batch applies");

    // The category is new and fine; the question id is dangling, so both the
    // question phase and the dependent answer row record failures.
    assert_eq!(outcome.categories_created, 1);
    assert!(outcome
        .details
        .iter()
        .any(|failure| failure.kind == ReconcileItemKind::Question
            && failure.error == "Question ID 404 not found"));
    assert!(outcome
        .details
        .iter()
        .any(|failure| failure.kind == ReconcileItemKind::Answer
            && failure.error == "Question not found"));
    assert_eq!(outcome.answers_created, 0);
}
