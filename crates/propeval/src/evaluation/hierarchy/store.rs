use crate::evaluation::StoreError;

use super::domain::{
    Answer, CategoryWithQuestions, LocalizedText, PropertyType, Question, QuestionCategory,
    QuestionWithAnswers,
};

/// Storage abstraction for the questionnaire hierarchy.
///
/// Implementations assign record ids on insert and are expected to enforce
/// parent existence (surfacing [`StoreError::ForeignKey`] otherwise).
/// Deleting a question removes its answers as well. Listings are returned
/// in ascending id order.
pub trait HierarchyStore: Send + Sync {
    fn insert_property_type(&self, name: LocalizedText) -> Result<PropertyType, StoreError>;
    fn fetch_property_type(&self, id: u64) -> Result<Option<PropertyType>, StoreError>;
    fn list_property_types(&self) -> Result<Vec<PropertyType>, StoreError>;
    fn delete_property_type(&self, id: u64) -> Result<(), StoreError>;

    fn insert_category(
        &self,
        property_type_id: u64,
        name: LocalizedText,
    ) -> Result<QuestionCategory, StoreError>;
    fn update_category(&self, category: QuestionCategory) -> Result<(), StoreError>;
    fn fetch_category(&self, id: u64) -> Result<Option<QuestionCategory>, StoreError>;
    fn categories_of(&self, property_type_id: u64) -> Result<Vec<QuestionCategory>, StoreError>;
    fn delete_category(&self, id: u64) -> Result<(), StoreError>;

    fn insert_question(
        &self,
        category_id: u64,
        text: LocalizedText,
        weight: u8,
    ) -> Result<Question, StoreError>;
    fn update_question(&self, question: Question) -> Result<(), StoreError>;
    fn fetch_question(&self, id: u64) -> Result<Option<Question>, StoreError>;
    fn questions_of(&self, category_id: u64) -> Result<Vec<Question>, StoreError>;
    fn delete_question(&self, id: u64) -> Result<(), StoreError>;

    fn insert_answer(
        &self,
        question_id: u64,
        text: LocalizedText,
        weight: u8,
    ) -> Result<Answer, StoreError>;
    fn update_answer(&self, answer: Answer) -> Result<(), StoreError>;
    fn fetch_answer(&self, id: u64) -> Result<Option<Answer>, StoreError>;
    fn answers_of(&self, question_id: u64) -> Result<Vec<Answer>, StoreError>;
}

/// Assemble the expanded category/question/answer slice of one property
/// type. Callers verify the property type exists beforehand.
pub(crate) fn load_tree<H>(
    store: &H,
    property_type_id: u64,
) -> Result<Vec<CategoryWithQuestions>, StoreError>
where
    H: HierarchyStore + ?Sized,
{
    let mut tree = Vec::new();
    for category in store.categories_of(property_type_id)? {
        let mut questions = Vec::new();
        for question in store.questions_of(category.id)? {
            let answers = store.answers_of(question.id)?;
            questions.push(QuestionWithAnswers { question, answers });
        }
        tree.push(CategoryWithQuestions {
            category,
            questions,
        });
    }
    Ok(tree)
}
