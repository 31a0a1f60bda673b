//! Bulk import of questionnaire hierarchies from flat sheets, with the
//! matching template and export downloads.
//!
//! The import path is deliberately forgiving: the whole batch is validated
//! up front, then applied best-effort so one bad row cannot hold the rest
//! of the sheet hostage. Callers get counts, per-item failures, and the
//! key → id mappings produced along the way.

mod reconciler;
pub mod router;
mod validate;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::evaluation::hierarchy::store::load_tree;
use crate::evaluation::hierarchy::HierarchyStore;
use crate::evaluation::sheet::{self, parse_sheet, ParsedRow, SheetError, SheetRow, TemplateKind};
use crate::evaluation::StoreError;

pub use reconciler::{IdMappings, ReconcileFailure, ReconcileItemKind, ReconcileOutcome};
pub use router::import_router;
pub use validate::{preflight, InvalidRow, PreflightReport, ValidationFailure};

use reconciler::reconcile;
use validate::validate_batch;

#[derive(Debug)]
pub enum BulkImportError {
    Io(std::io::Error),
    Sheet(SheetError),
    Validation(ValidationFailure),
    Store(StoreError),
}

impl std::fmt::Display for BulkImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BulkImportError::Io(err) => write!(f, "failed to read import sheet: {}", err),
            BulkImportError::Sheet(err) => write!(f, "invalid sheet data: {}", err),
            BulkImportError::Validation(err) => write!(f, "import rejected: {}", err),
            BulkImportError::Store(err) => write!(f, "storage failure during import: {}", err),
        }
    }
}

impl std::error::Error for BulkImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BulkImportError::Io(err) => Some(err),
            BulkImportError::Sheet(err) => Some(err),
            BulkImportError::Validation(err) => Some(err),
            BulkImportError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BulkImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SheetError> for BulkImportError {
    fn from(err: SheetError) -> Self {
        Self::Sheet(err)
    }
}

impl From<ValidationFailure> for BulkImportError {
    fn from(err: ValidationFailure) -> Self {
        Self::Validation(err)
    }
}

impl From<StoreError> for BulkImportError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Guardrails applied before a batch touches storage.
#[derive(Debug, Clone, Copy)]
pub struct ImportLimits {
    pub max_rows: usize,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self { max_rows: 5000 }
    }
}

/// CSV bytes plus the filename to advertise in `Content-Disposition`.
#[derive(Debug, Clone)]
pub struct SheetDownload {
    pub filename: &'static str,
    pub bytes: Vec<u8>,
}

/// Entry point tying the shared validator and the reconciler together,
/// plus the read-only template/export mirror of the same data shape.
pub struct BulkImportService<H> {
    store: Arc<H>,
    limits: ImportLimits,
}

impl<H> BulkImportService<H>
where
    H: HierarchyStore + 'static,
{
    pub fn new(store: Arc<H>, limits: ImportLimits) -> Self {
        Self { store, limits }
    }

    /// Import rows taken from a request body. Row numbers in validation
    /// details are 1-based positions in the payload.
    pub fn import(
        &self,
        rows: Vec<SheetRow>,
        replace_existing: bool,
    ) -> Result<ReconcileOutcome, BulkImportError> {
        let parsed = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| ParsedRow {
                line: index as u64 + 1,
                row,
                issues: Vec::new(),
            })
            .collect::<Vec<_>>();
        self.run(parsed, replace_existing)
    }

    /// Import a CSV sheet. Validation details keep the sheet's own line
    /// numbers so uploaders can find the offending rows.
    pub fn import_reader<R: std::io::Read>(
        &self,
        reader: R,
        replace_existing: bool,
    ) -> Result<ReconcileOutcome, BulkImportError> {
        let parsed = parse_sheet(reader)?;
        self.run(parsed, replace_existing)
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
        replace_existing: bool,
    ) -> Result<ReconcileOutcome, BulkImportError> {
        let file = std::fs::File::open(path)?;
        self.import_reader(file, replace_existing)
    }

    fn run(
        &self,
        parsed: Vec<ParsedRow>,
        replace_existing: bool,
    ) -> Result<ReconcileOutcome, BulkImportError> {
        validate_batch(&parsed, self.store.as_ref(), &self.limits)?;

        let rows: Vec<SheetRow> = parsed.into_iter().map(|entry| entry.row).collect();
        let outcome = reconcile(self.store.as_ref(), &rows, replace_existing);
        info!(
            categories_created = outcome.categories_created,
            categories_updated = outcome.categories_updated,
            questions_created = outcome.questions_created,
            questions_updated = outcome.questions_updated,
            answers_created = outcome.answers_created,
            answers_updated = outcome.answers_updated,
            failed = outcome.failed,
            rows_dropped = outcome.rows_dropped,
            "bulk import applied"
        );
        Ok(outcome)
    }

    /// Build a template or export download for one property type. Returns
    /// `Ok(None)` when the property type does not exist.
    pub fn generate_sheet(
        &self,
        kind: TemplateKind,
        property_type_id: u64,
    ) -> Result<Option<SheetDownload>, BulkImportError> {
        let Some(property_type) = self.store.fetch_property_type(property_type_id)? else {
            return Ok(None);
        };
        let tree = load_tree(self.store.as_ref(), property_type_id)?;
        let bytes = sheet::generate(kind, &property_type, &tree)?;
        Ok(Some(SheetDownload {
            filename: kind.filename(),
            bytes,
        }))
    }
}
