use std::sync::Arc;

use crate::evaluation::StoreError;

use super::domain::{
    weight_in_range, Answer, CategoryWithQuestions, LocalizedText, PropertyType, Question,
    QuestionCategory, MAX_WEIGHT, MIN_WEIGHT,
};
use super::store::{load_tree, HierarchyStore};

/// Administrative facade over the questionnaire hierarchy.
///
/// Creation validates the Romanian text and weight bounds; deletion is
/// guarded so records that still have children cannot disappear from under
/// running evaluations.
pub struct HierarchyService<H> {
    store: Arc<H>,
}

impl<H> HierarchyService<H>
where
    H: HierarchyStore + 'static,
{
    pub fn new(store: Arc<H>) -> Self {
        Self { store }
    }

    pub fn create_property_type(
        &self,
        name: LocalizedText,
    ) -> Result<PropertyType, HierarchyServiceError> {
        require_text("name_ro", &name)?;
        Ok(self.store.insert_property_type(name)?)
    }

    pub fn list_property_types(&self) -> Result<Vec<PropertyType>, HierarchyServiceError> {
        Ok(self.store.list_property_types()?)
    }

    pub fn delete_property_type(&self, id: u64) -> Result<(), HierarchyServiceError> {
        if self.store.fetch_property_type(id)?.is_none() {
            return Err(HierarchyServiceError::PropertyTypeNotFound(id));
        }
        let categories = self.store.categories_of(id)?;
        if !categories.is_empty() {
            return Err(HierarchyServiceError::PropertyTypeInUse {
                id,
                categories: categories.len(),
            });
        }
        Ok(self.store.delete_property_type(id)?)
    }

    pub fn create_category(
        &self,
        property_type_id: u64,
        name: LocalizedText,
    ) -> Result<QuestionCategory, HierarchyServiceError> {
        require_text("name_ro", &name)?;
        if self.store.fetch_property_type(property_type_id)?.is_none() {
            return Err(HierarchyServiceError::PropertyTypeNotFound(property_type_id));
        }
        Ok(self.store.insert_category(property_type_id, name)?)
    }

    pub fn delete_category(&self, id: u64) -> Result<(), HierarchyServiceError> {
        if self.store.fetch_category(id)?.is_none() {
            return Err(HierarchyServiceError::CategoryNotFound(id));
        }
        let questions = self.store.questions_of(id)?;
        if !questions.is_empty() {
            return Err(HierarchyServiceError::CategoryInUse {
                id,
                questions: questions.len(),
            });
        }
        Ok(self.store.delete_category(id)?)
    }

    pub fn create_question(
        &self,
        category_id: u64,
        text: LocalizedText,
        weight: u8,
    ) -> Result<Question, HierarchyServiceError> {
        require_text("text_ro", &text)?;
        require_weight(weight)?;
        if self.store.fetch_category(category_id)?.is_none() {
            return Err(HierarchyServiceError::CategoryNotFound(category_id));
        }
        Ok(self.store.insert_question(category_id, text, weight)?)
    }

    pub fn delete_question(&self, id: u64) -> Result<(), HierarchyServiceError> {
        if self.store.fetch_question(id)?.is_none() {
            return Err(HierarchyServiceError::QuestionNotFound(id));
        }
        Ok(self.store.delete_question(id)?)
    }

    pub fn create_answer(
        &self,
        question_id: u64,
        text: LocalizedText,
        weight: u8,
    ) -> Result<Answer, HierarchyServiceError> {
        require_text("text_ro", &text)?;
        require_weight(weight)?;
        if self.store.fetch_question(question_id)?.is_none() {
            return Err(HierarchyServiceError::QuestionNotFound(question_id));
        }
        Ok(self.store.insert_answer(question_id, text, weight)?)
    }

    /// Expanded slice of one property type, ready for scoring or export.
    pub fn property_tree(
        &self,
        property_type_id: u64,
    ) -> Result<Vec<CategoryWithQuestions>, HierarchyServiceError> {
        if self.store.fetch_property_type(property_type_id)?.is_none() {
            return Err(HierarchyServiceError::PropertyTypeNotFound(property_type_id));
        }
        Ok(load_tree(self.store.as_ref(), property_type_id)?)
    }
}

fn require_text(field: &'static str, text: &LocalizedText) -> Result<(), HierarchyServiceError> {
    if text.is_blank() {
        Err(HierarchyServiceError::BlankText(field))
    } else {
        Ok(())
    }
}

fn require_weight(weight: u8) -> Result<(), HierarchyServiceError> {
    if weight_in_range(weight) {
        Ok(())
    } else {
        Err(HierarchyServiceError::WeightOutOfRange(weight))
    }
}

/// Error raised by the hierarchy service.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyServiceError {
    #[error("{0} must contain Romanian text")]
    BlankText(&'static str),
    #[error("weight must be between {MIN_WEIGHT} and {MAX_WEIGHT}, got {0}")]
    WeightOutOfRange(u8),
    #[error("property type {0} not found")]
    PropertyTypeNotFound(u64),
    #[error("category {0} not found")]
    CategoryNotFound(u64),
    #[error("question {0} not found")]
    QuestionNotFound(u64),
    #[error("property type {id} still has {categories} categories")]
    PropertyTypeInUse { id: u64, categories: usize },
    #[error("category {id} still has {questions} questions")]
    CategoryInUse { id: u64, questions: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}
