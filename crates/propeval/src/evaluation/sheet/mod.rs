//! The flat-file wire contract shared by the template generator, the
//! exporter, the upload preflight, and the bulk import reconciler.
//!
//! A sheet is a CSV file whose first row is the canonical 12-column header.
//! Row 2 may carry human-readable instructions emitted by the template
//! generator; the parser skips it when its first cell is not numeric.

mod parse;
mod template;

pub use parse::{parse_sheet, ParsedRow, SheetError};
pub use template::{generate, TemplateKind};

use serde::{Deserialize, Serialize};

/// Canonical column order. Generators emit exactly this header and parsers
/// resolve uploaded headers against it.
pub const COLUMNS: [&str; 12] = [
    "property_type_id",
    "category_id",
    "category_name_ro",
    "category_name_en",
    "question_id",
    "question_ro",
    "question_en",
    "question_weight",
    "answer_id",
    "answer_ro",
    "answer_en",
    "answer_weight",
];

/// One flattened sheet row. An id of `0` means "create new"; a nonzero id
/// references an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    #[serde(default)]
    pub property_type_id: u64,
    #[serde(default)]
    pub category_id: u64,
    #[serde(default)]
    pub category_name_ro: String,
    #[serde(default)]
    pub category_name_en: String,
    #[serde(default)]
    pub question_id: u64,
    #[serde(default)]
    pub question_ro: String,
    #[serde(default)]
    pub question_en: String,
    #[serde(default)]
    pub question_weight: u8,
    #[serde(default)]
    pub answer_id: u64,
    #[serde(default)]
    pub answer_ro: String,
    #[serde(default)]
    pub answer_en: String,
    #[serde(default)]
    pub answer_weight: u8,
}

/// A single field-level problem on one row, reported back to the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub row: u64,
    pub column: &'static str,
    pub message: String,
}

/// Collapse case, spacing, underscores, and invisible characters so headers
/// exported from assorted spreadsheet tools still match.
pub(crate) fn normalize_header(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '\u{feff}' | '\u{200b}' | '_') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
