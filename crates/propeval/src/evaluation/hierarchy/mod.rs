//! Questionnaire hierarchy: property types, categories, questions, answers.

pub mod domain;
pub mod memory;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    weight_in_range, Answer, CategoryWithQuestions, LocalizedText, PropertyType, Question,
    QuestionCategory, QuestionWithAnswers, MAX_WEIGHT, MIN_WEIGHT,
};
pub use memory::InMemoryHierarchyStore;
pub use router::hierarchy_router;
pub use service::{HierarchyService, HierarchyServiceError};
pub use store::HierarchyStore;
