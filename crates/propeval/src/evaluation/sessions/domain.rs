use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluation::scoring::{AnswerSelection, ScoreLevel};

/// Free-text details about the evaluated property. Only the name is
/// required; everything else is context the user may add later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_year: Option<String>,
}

/// One completed evaluation attempt with its aggregate outcome frozen at
/// submission time. Only the property details may change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSession {
    pub id: u64,
    pub user_id: u64,
    pub property_type_id: u64,
    pub property: PropertyInfo,
    pub total_score: u32,
    pub max_possible_score: u32,
    pub percentage: f64,
    pub completion_rate: f64,
    pub level: ScoreLevel,
    pub badge: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// A single answered question with the weights captured when the user
/// submitted, so hierarchy edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEvaluationAnswer {
    pub id: u64,
    pub evaluation_session_id: u64,
    pub question_id: u64,
    pub answer_id: u64,
    pub question_weight: u8,
    pub answer_weight: u8,
    pub points_earned: u32,
}

/// Stringified answer for the legacy dynamic-field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomFieldValue {
    pub id: u64,
    pub evaluation_session_id: u64,
    pub custom_field_id: u64,
    pub value: String,
}

/// Legacy request counterpart of [`CustomFieldValue`] before ids exist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomFieldEntry {
    pub custom_field_id: u64,
    pub value: String,
}

/// Request body for a scored evaluation submission.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationSubmission {
    pub property_type_id: u64,
    pub property: PropertyInfo,
    #[serde(default)]
    pub answers: Vec<AnswerSelection>,
}

/// Request body for the legacy custom-field submission path. No scoring
/// runs; the session is stored with a pending level.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacySubmission {
    pub property_type_id: u64,
    pub property: PropertyInfo,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldEntry>,
}
