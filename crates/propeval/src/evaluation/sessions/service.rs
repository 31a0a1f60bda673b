use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::evaluation::hierarchy::store::load_tree;
use crate::evaluation::hierarchy::{weight_in_range, HierarchyStore, MAX_WEIGHT, MIN_WEIGHT};
use crate::evaluation::scoring::{compute_result, EvaluationResult, ScoreLevel};
use crate::evaluation::StoreError;

use super::domain::{
    CustomFieldValue, EvaluationSession, EvaluationSubmission, LegacySubmission, PropertyInfo,
    UserEvaluationAnswer,
};
use super::store::{SessionRecord, SessionStore};

/// Outcome of a scored submission: the stored session plus the full result
/// with its per-category breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedEvaluation {
    pub session: EvaluationSession,
    pub result: EvaluationResult,
}

/// Runs evaluations end to end: validates a submission, scores it against
/// the current hierarchy and persists the session with frozen weights.
pub struct EvaluationSessionService<S, H> {
    sessions: Arc<S>,
    hierarchy: Arc<H>,
}

impl<S, H> EvaluationSessionService<S, H>
where
    S: SessionStore + 'static,
    H: HierarchyStore + 'static,
{
    pub fn new(sessions: Arc<S>, hierarchy: Arc<H>) -> Self {
        Self {
            sessions,
            hierarchy,
        }
    }

    /// Score and persist one submission for `user_id`.
    ///
    /// The weights in each selection are what the client saw when answering;
    /// they are range-checked here and then frozen onto the stored rows, so
    /// later hierarchy edits never rewrite an existing score.
    pub fn submit(
        &self,
        user_id: u64,
        submission: EvaluationSubmission,
    ) -> Result<SubmittedEvaluation, SessionServiceError> {
        let EvaluationSubmission {
            property_type_id,
            property,
            answers,
        } = submission;
        require_property_name(&property)?;
        if self.hierarchy.fetch_property_type(property_type_id)?.is_none() {
            return Err(SessionServiceError::PropertyTypeNotFound(property_type_id));
        }
        for selection in &answers {
            if !weight_in_range(selection.question_weight)
                || !weight_in_range(selection.answer_weight)
            {
                return Err(SessionServiceError::InvalidSnapshot {
                    question_id: selection.question_id,
                });
            }
        }

        let tree = load_tree(self.hierarchy.as_ref(), property_type_id)?;
        let result = compute_result(&tree, &answers);
        let now = Utc::now();
        let session = EvaluationSession {
            id: 0,
            user_id,
            property_type_id,
            property,
            total_score: result.total_score,
            max_possible_score: result.max_possible_score,
            percentage: result.percentage,
            completion_rate: result.completion_rate,
            level: result.level,
            badge: result.badge.clone(),
            created_at: now,
            completed_at: now,
        };
        let stored_answers = answers
            .iter()
            .map(|selection| UserEvaluationAnswer {
                id: 0,
                evaluation_session_id: 0,
                question_id: selection.question_id,
                answer_id: selection.answer_id,
                question_weight: selection.question_weight,
                answer_weight: selection.answer_weight,
                points_earned: selection.points(),
            })
            .collect();

        let record = self
            .sessions
            .insert_session(session, stored_answers, Vec::new())?;
        tracing::info!(
            session_id = record.session.id,
            user_id,
            property_type_id,
            total_score = record.session.total_score,
            percentage = record.session.percentage,
            "evaluation session stored"
        );
        Ok(SubmittedEvaluation {
            session: record.session,
            result,
        })
    }

    /// Persist a legacy custom-field submission. Nothing is scored; the
    /// session is stored with a pending level and an empty badge.
    pub fn submit_legacy(
        &self,
        user_id: u64,
        submission: LegacySubmission,
    ) -> Result<EvaluationSession, SessionServiceError> {
        let LegacySubmission {
            property_type_id,
            property,
            custom_fields,
        } = submission;
        require_property_name(&property)?;
        if self.hierarchy.fetch_property_type(property_type_id)?.is_none() {
            return Err(SessionServiceError::PropertyTypeNotFound(property_type_id));
        }

        let now = Utc::now();
        let session = EvaluationSession {
            id: 0,
            user_id,
            property_type_id,
            property,
            total_score: 0,
            max_possible_score: 0,
            percentage: 0.0,
            completion_rate: 0.0,
            level: ScoreLevel::Pending,
            badge: String::new(),
            created_at: now,
            completed_at: now,
        };
        let values = custom_fields
            .into_iter()
            .map(|entry| CustomFieldValue {
                id: 0,
                evaluation_session_id: 0,
                custom_field_id: entry.custom_field_id,
                value: entry.value,
            })
            .collect();

        let record = self.sessions.insert_session(session, Vec::new(), values)?;
        tracing::info!(
            session_id = record.session.id,
            user_id,
            property_type_id,
            custom_fields = record.custom_fields.len(),
            "legacy evaluation session stored"
        );
        Ok(record.session)
    }

    pub fn get(&self, session_id: u64) -> Result<SessionRecord, SessionServiceError> {
        self.sessions
            .fetch_session(session_id)?
            .ok_or(SessionServiceError::SessionNotFound(session_id))
    }

    pub fn sessions_for(
        &self,
        user_id: u64,
    ) -> Result<Vec<EvaluationSession>, SessionServiceError> {
        Ok(self.sessions.sessions_of_user(user_id)?)
    }

    /// Replace the property details of a stored session. Scores and answer
    /// snapshots stay untouched.
    pub fn update_property_info(
        &self,
        session_id: u64,
        property: PropertyInfo,
    ) -> Result<SessionRecord, SessionServiceError> {
        require_property_name(&property)?;
        match self.sessions.update_property_info(session_id, property) {
            Ok(()) => self.get(session_id),
            Err(StoreError::NotFound) => Err(SessionServiceError::SessionNotFound(session_id)),
            Err(err) => Err(err.into()),
        }
    }
}

fn require_property_name(property: &PropertyInfo) -> Result<(), SessionServiceError> {
    if property.name.trim().is_empty() {
        Err(SessionServiceError::MissingPropertyName)
    } else {
        Ok(())
    }
}

/// Error raised by the evaluation session service.
#[derive(Debug, thiserror::Error)]
pub enum SessionServiceError {
    #[error("property type {0} not found")]
    PropertyTypeNotFound(u64),
    #[error("evaluation session {0} not found")]
    SessionNotFound(u64),
    #[error("property name is required")]
    MissingPropertyName,
    #[error("selection for question {question_id} carries a weight outside {MIN_WEIGHT} to {MAX_WEIGHT}")]
    InvalidSnapshot { question_id: u64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}
