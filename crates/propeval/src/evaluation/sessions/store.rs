use serde::Serialize;

use crate::evaluation::StoreError;

use super::domain::{CustomFieldValue, EvaluationSession, PropertyInfo, UserEvaluationAnswer};

/// A session together with every dependent row captured at submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    #[serde(flatten)]
    pub session: EvaluationSession,
    pub answers: Vec<UserEvaluationAnswer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomFieldValue>,
}

/// Persistence seam for evaluation sessions.
///
/// `insert_session` takes the session and all dependent rows in one call so
/// a backend can persist them atomically. The store assigns the session id
/// and stamps it onto every answer and custom field before returning.
pub trait SessionStore: Send + Sync {
    fn insert_session(
        &self,
        session: EvaluationSession,
        answers: Vec<UserEvaluationAnswer>,
        custom_fields: Vec<CustomFieldValue>,
    ) -> Result<SessionRecord, StoreError>;

    fn fetch_session(&self, session_id: u64) -> Result<Option<SessionRecord>, StoreError>;

    /// Sessions owned by one user, ordered by id.
    fn sessions_of_user(&self, user_id: u64) -> Result<Vec<EvaluationSession>, StoreError>;

    fn update_property_info(
        &self,
        session_id: u64,
        property: PropertyInfo,
    ) -> Result<(), StoreError>;
}
