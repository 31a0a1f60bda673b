use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive bounds for question and answer weights.
pub const MIN_WEIGHT: u8 = 1;
pub const MAX_WEIGHT: u8 = 10;

pub fn weight_in_range(value: u8) -> bool {
    (MIN_WEIGHT..=MAX_WEIGHT).contains(&value)
}

/// Romanian-first label pair carried by every hierarchy record. The `ro`
/// text is mandatory across the platform; `en` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub ro: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    pub fn new(ro: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ro: ro.into(),
            en: en.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.ro.trim().is_empty()
    }
}

/// Top of the questionnaire hierarchy (e.g. apartment, house).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    pub id: u64,
    pub name: LocalizedText,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Thematic grouping of questions under one property type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCategory {
    pub id: u64,
    pub property_type_id: u64,
    pub name: LocalizedText,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A weighted question inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub category_id: u64,
    pub text: LocalizedText,
    pub weight: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A selectable, weighted answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: u64,
    pub question_id: u64,
    pub text: LocalizedText,
    pub weight: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A question joined with its answer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionWithAnswers {
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// Fully expanded slice of one property type, consumed by the scoring
/// engine and the sheet generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryWithQuestions {
    pub category: QuestionCategory,
    pub questions: Vec<QuestionWithAnswers>,
}
