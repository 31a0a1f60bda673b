//! Evaluation sessions: scored submissions with answer rows frozen at
//! submission time, plus the legacy custom-field path.

pub mod domain;
pub mod memory;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    CustomFieldEntry, CustomFieldValue, EvaluationSession, EvaluationSubmission, LegacySubmission,
    PropertyInfo, UserEvaluationAnswer,
};
pub use memory::InMemorySessionStore;
pub use router::evaluation_router;
pub use service::{EvaluationSessionService, SessionServiceError, SubmittedEvaluation};
pub use store::{SessionRecord, SessionStore};
