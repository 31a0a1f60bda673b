use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::evaluation::hierarchy::{weight_in_range, HierarchyStore, MAX_WEIGHT, MIN_WEIGHT};
use crate::evaluation::sheet::{parse_sheet, ParsedRow, RowIssue, SheetError, SheetRow};

use super::{BulkImportError, ImportLimits};

/// Whole-batch rejection carrying field-level details. Serialized verbatim
/// as the 400 response body.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationFailure {
    pub error: String,
    pub details: Vec<RowIssue>,
}

impl ValidationFailure {
    pub(crate) fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Vec::new(),
        }
    }

    pub(crate) fn rows(details: Vec<RowIssue>) -> Self {
        Self {
            error: "import batch failed validation".to_string(),
            details,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.details.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{} ({} field issues)", self.error, self.details.len())
        }
    }
}

impl std::error::Error for ValidationFailure {}

/// A row excluded from an upload by the preflight check.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidRow {
    pub row: u64,
    pub issues: Vec<RowIssue>,
}

/// Outcome of the pre-upload file check: rows safe to submit and rows to
/// fix, each with its reasons.
#[derive(Debug, Serialize)]
pub struct PreflightReport {
    pub valid: Vec<SheetRow>,
    pub invalid: Vec<InvalidRow>,
}

impl PreflightReport {
    pub fn all_valid(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Check a sheet against the per-row rules without touching storage,
/// mirroring what the importer will enforce. Property type existence is
/// left to the importer since it requires a lookup.
pub fn preflight<R: Read>(reader: R) -> Result<PreflightReport, SheetError> {
    let parsed = parse_sheet(reader)?;
    let mut report = PreflightReport {
        valid: Vec::new(),
        invalid: Vec::new(),
    };

    for entry in parsed {
        let issues = collect_issues(&entry);
        if issues.is_empty() {
            report.valid.push(entry.row);
        } else {
            report.invalid.push(InvalidRow {
                row: entry.line,
                issues,
            });
        }
    }

    Ok(report)
}

/// Reject the whole batch when any row breaks the field rules, when the
/// batch is empty or oversized, or when a referenced property type does
/// not exist. Property types are checked once per distinct id.
pub(crate) fn validate_batch<H>(
    parsed: &[ParsedRow],
    store: &H,
    limits: &ImportLimits,
) -> Result<(), BulkImportError>
where
    H: HierarchyStore + ?Sized,
{
    if parsed.is_empty() {
        return Err(ValidationFailure::message("import batch is empty").into());
    }
    if parsed.len() > limits.max_rows {
        return Err(ValidationFailure::message(format!(
            "import batch has {} rows, exceeding the limit of {}",
            parsed.len(),
            limits.max_rows
        ))
        .into());
    }

    let mut property_types: HashMap<u64, bool> = HashMap::new();
    let mut details = Vec::new();

    for entry in parsed {
        let id = entry.row.property_type_id;
        if let std::collections::hash_map::Entry::Vacant(slot) = property_types.entry(id) {
            let exists = id != 0 && store.fetch_property_type(id)?.is_some();
            slot.insert(exists);
            if !exists {
                details.push(RowIssue {
                    row: entry.line,
                    column: "property_type_id",
                    message: if id == 0 {
                        "property_type_id is required".to_string()
                    } else {
                        format!("property_type_id {id} does not exist")
                    },
                });
            }
        }

        details.extend(collect_issues(entry));
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::rows(details).into())
    }
}

/// Parse-time cell problems first, then field rules for the cells that
/// coerced cleanly.
fn collect_issues(entry: &ParsedRow) -> Vec<RowIssue> {
    let mut issues = entry.issues.clone();
    let flagged: HashSet<&str> = issues.iter().map(|issue| issue.column).collect();
    for issue in row_issues(entry.line, &entry.row) {
        if !flagged.contains(issue.column) {
            issues.push(issue);
        }
    }
    issues
}

/// Field rules shared by the preflight check and the import path.
pub(crate) fn row_issues(line: u64, row: &SheetRow) -> Vec<RowIssue> {
    let mut issues = Vec::new();
    require_text(line, "category_name_ro", &row.category_name_ro, &mut issues);
    require_text(line, "question_ro", &row.question_ro, &mut issues);
    require_text(line, "answer_ro", &row.answer_ro, &mut issues);
    check_weight(line, "question_weight", row.question_weight, &mut issues);
    check_weight(line, "answer_weight", row.answer_weight, &mut issues);
    issues
}

fn require_text(line: u64, column: &'static str, value: &str, issues: &mut Vec<RowIssue>) {
    if value.trim().is_empty() {
        issues.push(RowIssue {
            row: line,
            column,
            message: format!("{column} is required"),
        });
    }
}

fn check_weight(line: u64, column: &'static str, value: u8, issues: &mut Vec<RowIssue>) {
    if value == 0 {
        issues.push(RowIssue {
            row: line,
            column,
            message: format!("{column} is 0 or missing; re-download the template"),
        });
    } else if !weight_in_range(value) {
        issues.push(RowIssue {
            row: line,
            column,
            message: format!("{column} must be between {MIN_WEIGHT} and {MAX_WEIGHT}, got {value}"),
        });
    }
}
