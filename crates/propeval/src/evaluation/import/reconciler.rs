use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::evaluation::hierarchy::{HierarchyStore, LocalizedText};
use crate::evaluation::sheet::SheetRow;

/// Key → id mappings accumulated while the three phases run, scoped to a
/// single reconcile call. Keys are composite strings of the form
/// `"{parent_id}|{romanian_text}"`.
#[derive(Debug, Default)]
struct ReconcileContext {
    categories: BTreeMap<String, u64>,
    questions: BTreeMap<String, u64>,
    answers: BTreeMap<String, u64>,
}

fn composite_key(parent: u64, text: &str) -> String {
    format!("{parent}|{text}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileItemKind {
    Category,
    Question,
    Answer,
}

/// One item the reconciler could not apply. The batch keeps going; these
/// are reported alongside the counts.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileFailure {
    #[serde(rename = "type")]
    pub kind: ReconcileItemKind,
    pub name: String,
    pub error: String,
}

/// Composite-key → persisted-id mappings, returned so callers can relate
/// sheet rows to the records they now own.
#[derive(Debug, Default, Serialize)]
pub struct IdMappings {
    pub categories: BTreeMap<String, u64>,
    pub questions: BTreeMap<String, u64>,
    pub answers: BTreeMap<String, u64>,
}

#[derive(Debug, Default, Serialize)]
pub struct ReconcileOutcome {
    pub categories_created: usize,
    pub categories_updated: usize,
    pub questions_created: usize,
    pub questions_updated: usize,
    pub answers_created: usize,
    pub answers_updated: usize,
    pub failed: usize,
    pub rows_dropped: usize,
    pub details: Vec<ReconcileFailure>,
    pub id_mappings: IdMappings,
}

impl ReconcileOutcome {
    fn record_failure(&mut self, kind: ReconcileItemKind, name: &str, error: impl Into<String>) {
        self.failed += 1;
        self.details.push(ReconcileFailure {
            kind,
            name: name.to_string(),
            error: error.into(),
        });
    }
}

/// Apply a validated batch to the hierarchy in three phases: categories,
/// then questions, then answers, so each phase can resolve the ids the
/// previous one produced. An id of 0 creates a record; a nonzero id must
/// reference an existing record, rewritten only when `replace_existing`
/// is set. Failures are captured per item and never abort the batch, so
/// partial imports persist.
pub(crate) fn reconcile<H>(store: &H, rows: &[SheetRow], replace_existing: bool) -> ReconcileOutcome
where
    H: HierarchyStore + ?Sized,
{
    let mut outcome = ReconcileOutcome::default();
    let mut context = ReconcileContext::default();

    reconcile_categories(store, rows, replace_existing, &mut context, &mut outcome);
    reconcile_questions(store, rows, replace_existing, &mut context, &mut outcome);
    reconcile_answers(store, rows, replace_existing, &mut context, &mut outcome);

    outcome.id_mappings = IdMappings {
        categories: context.categories,
        questions: context.questions,
        answers: context.answers,
    };
    outcome
}

/// Rows sharing `(property_type_id, category_name_ro)` describe one
/// category; the first row of each group wins.
fn reconcile_categories<H>(
    store: &H,
    rows: &[SheetRow],
    replace_existing: bool,
    context: &mut ReconcileContext,
    outcome: &mut ReconcileOutcome,
) where
    H: HierarchyStore + ?Sized,
{
    let mut seen = HashSet::new();
    for row in rows {
        let key = composite_key(row.property_type_id, &row.category_name_ro);
        if !seen.insert(key.clone()) {
            continue;
        }

        if row.category_id == 0 {
            match store.insert_category(
                row.property_type_id,
                LocalizedText::new(row.category_name_ro.clone(), row.category_name_en.clone()),
            ) {
                Ok(category) => {
                    outcome.categories_created += 1;
                    context.categories.insert(key, category.id);
                }
                Err(err) => outcome.record_failure(
                    ReconcileItemKind::Category,
                    &row.category_name_ro,
                    err.to_string(),
                ),
            }
            continue;
        }

        match store.fetch_category(row.category_id) {
            Ok(Some(mut category)) => {
                if replace_existing {
                    category.name = LocalizedText::new(
                        row.category_name_ro.clone(),
                        row.category_name_en.clone(),
                    );
                    match store.update_category(category) {
                        Ok(()) => {
                            outcome.categories_updated += 1;
                            context.categories.insert(key, row.category_id);
                        }
                        Err(err) => outcome.record_failure(
                            ReconcileItemKind::Category,
                            &row.category_name_ro,
                            err.to_string(),
                        ),
                    }
                } else {
                    context.categories.insert(key, row.category_id);
                }
            }
            Ok(None) => outcome.record_failure(
                ReconcileItemKind::Category,
                &row.category_name_ro,
                format!("Category ID {} not found", row.category_id),
            ),
            Err(err) => outcome.record_failure(
                ReconcileItemKind::Category,
                &row.category_name_ro,
                err.to_string(),
            ),
        }
    }
}

/// Rows sharing `(resolved_category_id, question_ro)` describe one
/// question. Rows whose category never resolved are dropped from the
/// grouping and surfaced through `rows_dropped`.
fn reconcile_questions<H>(
    store: &H,
    rows: &[SheetRow],
    replace_existing: bool,
    context: &mut ReconcileContext,
    outcome: &mut ReconcileOutcome,
) where
    H: HierarchyStore + ?Sized,
{
    let mut seen = HashSet::new();
    for row in rows {
        let category_key = composite_key(row.property_type_id, &row.category_name_ro);
        let Some(&category_id) = context.categories.get(&category_key) else {
            outcome.rows_dropped += 1;
            continue;
        };

        let key = composite_key(category_id, &row.question_ro);
        if !seen.insert(key.clone()) {
            continue;
        }

        if row.question_id == 0 {
            match store.insert_question(
                category_id,
                LocalizedText::new(row.question_ro.clone(), row.question_en.clone()),
                row.question_weight,
            ) {
                Ok(question) => {
                    outcome.questions_created += 1;
                    context.questions.insert(key, question.id);
                }
                Err(err) => outcome.record_failure(
                    ReconcileItemKind::Question,
                    &row.question_ro,
                    err.to_string(),
                ),
            }
            continue;
        }

        match store.fetch_question(row.question_id) {
            Ok(Some(mut question)) => {
                if replace_existing {
                    question.text =
                        LocalizedText::new(row.question_ro.clone(), row.question_en.clone());
                    question.weight = row.question_weight;
                    match store.update_question(question) {
                        Ok(()) => {
                            outcome.questions_updated += 1;
                            context.questions.insert(key, row.question_id);
                        }
                        Err(err) => outcome.record_failure(
                            ReconcileItemKind::Question,
                            &row.question_ro,
                            err.to_string(),
                        ),
                    }
                } else {
                    context.questions.insert(key, row.question_id);
                }
            }
            Ok(None) => outcome.record_failure(
                ReconcileItemKind::Question,
                &row.question_ro,
                format!("Question ID {} not found", row.question_id),
            ),
            Err(err) => outcome.record_failure(
                ReconcileItemKind::Question,
                &row.question_ro,
                err.to_string(),
            ),
        }
    }
}

/// Answers are taken row by row without grouping since several rows share
/// one question. Resolution failures count against the row, not the batch.
fn reconcile_answers<H>(
    store: &H,
    rows: &[SheetRow],
    replace_existing: bool,
    context: &mut ReconcileContext,
    outcome: &mut ReconcileOutcome,
) where
    H: HierarchyStore + ?Sized,
{
    for row in rows {
        let category_key = composite_key(row.property_type_id, &row.category_name_ro);
        let Some(&category_id) = context.categories.get(&category_key) else {
            outcome.record_failure(ReconcileItemKind::Answer, &row.answer_ro, "Category not found");
            continue;
        };

        let question_key = composite_key(category_id, &row.question_ro);
        let Some(&question_id) = context.questions.get(&question_key) else {
            outcome.record_failure(ReconcileItemKind::Answer, &row.answer_ro, "Question not found");
            continue;
        };

        let key = composite_key(question_id, &row.answer_ro);
        if row.answer_id == 0 {
            match store.insert_answer(
                question_id,
                LocalizedText::new(row.answer_ro.clone(), row.answer_en.clone()),
                row.answer_weight,
            ) {
                Ok(answer) => {
                    outcome.answers_created += 1;
                    context.answers.insert(key, answer.id);
                }
                Err(err) => outcome.record_failure(
                    ReconcileItemKind::Answer,
                    &row.answer_ro,
                    err.to_string(),
                ),
            }
            continue;
        }

        match store.fetch_answer(row.answer_id) {
            Ok(Some(mut answer)) => {
                if replace_existing {
                    answer.text = LocalizedText::new(row.answer_ro.clone(), row.answer_en.clone());
                    answer.weight = row.answer_weight;
                    match store.update_answer(answer) {
                        Ok(()) => {
                            outcome.answers_updated += 1;
                            context.answers.insert(key, row.answer_id);
                        }
                        Err(err) => outcome.record_failure(
                            ReconcileItemKind::Answer,
                            &row.answer_ro,
                            err.to_string(),
                        ),
                    }
                } else {
                    context.answers.insert(key, row.answer_id);
                }
            }
            Ok(None) => outcome.record_failure(
                ReconcileItemKind::Answer,
                &row.answer_ro,
                format!("Answer ID {} not found", row.answer_id),
            ),
            Err(err) => outcome.record_failure(
                ReconcileItemKind::Answer,
                &row.answer_ro,
                err.to_string(),
            ),
        }
    }
}
