//! Core building blocks for the property evaluation platform.
//!
//! The crate models a weighted questionnaire hierarchy (property types,
//! question categories, questions, answers), scores user submissions,
//! reconciles bulk sheet imports against the hierarchy, generates the
//! matching templates and exports, and persists evaluation sessions.
//! Storage and identity are reached through traits so the HTTP service,
//! the CLI, and the test suites can swap implementations freely.

pub mod auth;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod telemetry;
