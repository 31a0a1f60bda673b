//! Property evaluation domain: questionnaire hierarchy, scoring, bulk
//! import/export, and persisted evaluation sessions.

pub mod hierarchy;
pub mod import;
pub mod scoring;
pub mod sessions;
pub mod sheet;

/// Error enumeration for storage failures, classified so operator-facing
/// messages can name the infrastructure problem.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("operation violates a foreign key constraint: {0}")]
    ForeignKey(String),
    #[error("database schema missing a required relation: {0}")]
    Schema(String),
    #[error("database connection failed: {0}")]
    Unavailable(String),
}
