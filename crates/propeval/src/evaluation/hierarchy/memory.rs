use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::evaluation::StoreError;

use super::domain::{Answer, LocalizedText, PropertyType, Question, QuestionCategory};
use super::store::HierarchyStore;

#[derive(Default)]
struct HierarchyTables {
    property_types: HashMap<u64, PropertyType>,
    categories: HashMap<u64, QuestionCategory>,
    questions: HashMap<u64, Question>,
    answers: HashMap<u64, Answer>,
}

/// Mutex-guarded hierarchy store used by local development, the CLI, and
/// the test suites. Ids are assigned from a shared sequence.
#[derive(Default, Clone)]
pub struct InMemoryHierarchyStore {
    tables: Arc<Mutex<HierarchyTables>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryHierarchyStore {
    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl HierarchyStore for InMemoryHierarchyStore {
    fn insert_property_type(&self, name: LocalizedText) -> Result<PropertyType, StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        let now = Utc::now();
        let property_type = PropertyType {
            id: self.next_id(),
            name,
            created_at: now,
            updated_at: now,
        };
        guard
            .property_types
            .insert(property_type.id, property_type.clone());
        Ok(property_type)
    }

    fn fetch_property_type(&self, id: u64) -> Result<Option<PropertyType>, StoreError> {
        let guard = self.tables.lock().expect("hierarchy mutex poisoned");
        Ok(guard.property_types.get(&id).cloned())
    }

    fn list_property_types(&self) -> Result<Vec<PropertyType>, StoreError> {
        let guard = self.tables.lock().expect("hierarchy mutex poisoned");
        let mut types: Vec<_> = guard.property_types.values().cloned().collect();
        types.sort_by_key(|property_type| property_type.id);
        Ok(types)
    }

    fn delete_property_type(&self, id: u64) -> Result<(), StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        guard
            .property_types
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn insert_category(
        &self,
        property_type_id: u64,
        name: LocalizedText,
    ) -> Result<QuestionCategory, StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        if !guard.property_types.contains_key(&property_type_id) {
            return Err(StoreError::ForeignKey(format!(
                "property type {property_type_id} does not exist"
            )));
        }
        let now = Utc::now();
        let category = QuestionCategory {
            id: self.next_id(),
            property_type_id,
            name,
            created_at: now,
            updated_at: now,
        };
        guard.categories.insert(category.id, category.clone());
        Ok(category)
    }

    fn update_category(&self, mut category: QuestionCategory) -> Result<(), StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        if guard.categories.contains_key(&category.id) {
            category.updated_at = Utc::now();
            guard.categories.insert(category.id, category);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch_category(&self, id: u64) -> Result<Option<QuestionCategory>, StoreError> {
        let guard = self.tables.lock().expect("hierarchy mutex poisoned");
        Ok(guard.categories.get(&id).cloned())
    }

    fn categories_of(&self, property_type_id: u64) -> Result<Vec<QuestionCategory>, StoreError> {
        let guard = self.tables.lock().expect("hierarchy mutex poisoned");
        let mut categories: Vec<_> = guard
            .categories
            .values()
            .filter(|category| category.property_type_id == property_type_id)
            .cloned()
            .collect();
        categories.sort_by_key(|category| category.id);
        Ok(categories)
    }

    fn delete_category(&self, id: u64) -> Result<(), StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        guard
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn insert_question(
        &self,
        category_id: u64,
        text: LocalizedText,
        weight: u8,
    ) -> Result<Question, StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        if !guard.categories.contains_key(&category_id) {
            return Err(StoreError::ForeignKey(format!(
                "category {category_id} does not exist"
            )));
        }
        let now = Utc::now();
        let question = Question {
            id: self.next_id(),
            category_id,
            text,
            weight,
            created_at: now,
            updated_at: now,
        };
        guard.questions.insert(question.id, question.clone());
        Ok(question)
    }

    fn update_question(&self, mut question: Question) -> Result<(), StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        if guard.questions.contains_key(&question.id) {
            question.updated_at = Utc::now();
            guard.questions.insert(question.id, question);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch_question(&self, id: u64) -> Result<Option<Question>, StoreError> {
        let guard = self.tables.lock().expect("hierarchy mutex poisoned");
        Ok(guard.questions.get(&id).cloned())
    }

    fn questions_of(&self, category_id: u64) -> Result<Vec<Question>, StoreError> {
        let guard = self.tables.lock().expect("hierarchy mutex poisoned");
        let mut questions: Vec<_> = guard
            .questions
            .values()
            .filter(|question| question.category_id == category_id)
            .cloned()
            .collect();
        questions.sort_by_key(|question| question.id);
        Ok(questions)
    }

    fn delete_question(&self, id: u64) -> Result<(), StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        guard
            .questions
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)?;
        guard.answers.retain(|_, answer| answer.question_id != id);
        Ok(())
    }

    fn insert_answer(
        &self,
        question_id: u64,
        text: LocalizedText,
        weight: u8,
    ) -> Result<Answer, StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        if !guard.questions.contains_key(&question_id) {
            return Err(StoreError::ForeignKey(format!(
                "question {question_id} does not exist"
            )));
        }
        let now = Utc::now();
        let answer = Answer {
            id: self.next_id(),
            question_id,
            text,
            weight,
            created_at: now,
            updated_at: now,
        };
        guard.answers.insert(answer.id, answer.clone());
        Ok(answer)
    }

    fn update_answer(&self, mut answer: Answer) -> Result<(), StoreError> {
        let mut guard = self.tables.lock().expect("hierarchy mutex poisoned");
        if guard.answers.contains_key(&answer.id) {
            answer.updated_at = Utc::now();
            guard.answers.insert(answer.id, answer);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch_answer(&self, id: u64) -> Result<Option<Answer>, StoreError> {
        let guard = self.tables.lock().expect("hierarchy mutex poisoned");
        Ok(guard.answers.get(&id).cloned())
    }

    fn answers_of(&self, question_id: u64) -> Result<Vec<Answer>, StoreError> {
        let guard = self.tables.lock().expect("hierarchy mutex poisoned");
        let mut answers: Vec<_> = guard
            .answers
            .values()
            .filter(|answer| answer.question_id == question_id)
            .cloned()
            .collect();
        answers.sort_by_key(|answer| answer.id);
        Ok(answers)
    }
}
