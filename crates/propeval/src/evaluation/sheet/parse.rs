use std::collections::HashMap;
use std::io::Read;

use csv::StringRecord;

use super::{normalize_header, RowIssue, SheetRow, COLUMNS};

/// A data row with its 1-based sheet line and any cell-level problems
/// found while coercing numeric fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub line: u64,
    pub row: SheetRow,
    pub issues: Vec<RowIssue>,
}

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("sheet has no header row")]
    Empty,
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
    #[error("invalid csv data: {0}")]
    Csv(#[from] csv::Error),
}

/// Read a CSV sheet, resolving the canonical columns against the uploaded
/// header and coercing numeric cells (empty cells become 0). Row 2 is
/// treated as the generator's instructions row and skipped when its
/// `property_type_id` cell does not parse as an unsigned integer.
pub fn parse_sheet<R: Read>(reader: R) -> Result<Vec<ParsedRow>, SheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(SheetError::Empty),
    };
    let columns = resolve_columns(&header)?;

    let mut rows = Vec::new();
    for (index, record) in records.enumerate() {
        let record = record?;
        if index == 0 && is_instruction_row(&record, &columns) {
            continue;
        }
        // Header occupies line 1.
        rows.push(parse_row(&record, &columns, index as u64 + 2));
    }
    Ok(rows)
}

struct ColumnIndex {
    property_type_id: usize,
    category_id: usize,
    category_name_ro: usize,
    category_name_en: usize,
    question_id: usize,
    question_ro: usize,
    question_en: usize,
    question_weight: usize,
    answer_id: usize,
    answer_ro: usize,
    answer_en: usize,
    answer_weight: usize,
}

fn resolve_columns(header: &StringRecord) -> Result<ColumnIndex, SheetError> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (index, name) in header.iter().enumerate() {
        positions.entry(normalize_header(name)).or_insert(index);
    }

    let mut missing = Vec::new();
    let columns = ColumnIndex {
        property_type_id: lookup(&positions, COLUMNS[0], &mut missing),
        category_id: lookup(&positions, COLUMNS[1], &mut missing),
        category_name_ro: lookup(&positions, COLUMNS[2], &mut missing),
        category_name_en: lookup(&positions, COLUMNS[3], &mut missing),
        question_id: lookup(&positions, COLUMNS[4], &mut missing),
        question_ro: lookup(&positions, COLUMNS[5], &mut missing),
        question_en: lookup(&positions, COLUMNS[6], &mut missing),
        question_weight: lookup(&positions, COLUMNS[7], &mut missing),
        answer_id: lookup(&positions, COLUMNS[8], &mut missing),
        answer_ro: lookup(&positions, COLUMNS[9], &mut missing),
        answer_en: lookup(&positions, COLUMNS[10], &mut missing),
        answer_weight: lookup(&positions, COLUMNS[11], &mut missing),
    };

    if missing.is_empty() {
        Ok(columns)
    } else {
        Err(SheetError::MissingColumns(missing))
    }
}

fn lookup(
    positions: &HashMap<String, usize>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> usize {
    match positions.get(&normalize_header(name)) {
        Some(&index) => index,
        None => {
            missing.push(name);
            usize::MAX
        }
    }
}

fn cell<'a>(record: &'a StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

fn is_instruction_row(record: &StringRecord, columns: &ColumnIndex) -> bool {
    cell(record, columns.property_type_id).parse::<u64>().is_err()
}

fn parse_row(record: &StringRecord, columns: &ColumnIndex, line: u64) -> ParsedRow {
    let mut issues = Vec::new();
    let row = SheetRow {
        property_type_id: parse_id(record, columns.property_type_id, COLUMNS[0], line, &mut issues),
        category_id: parse_id(record, columns.category_id, COLUMNS[1], line, &mut issues),
        category_name_ro: cell(record, columns.category_name_ro).to_string(),
        category_name_en: cell(record, columns.category_name_en).to_string(),
        question_id: parse_id(record, columns.question_id, COLUMNS[4], line, &mut issues),
        question_ro: cell(record, columns.question_ro).to_string(),
        question_en: cell(record, columns.question_en).to_string(),
        question_weight: parse_weight(
            record,
            columns.question_weight,
            COLUMNS[7],
            line,
            &mut issues,
        ),
        answer_id: parse_id(record, columns.answer_id, COLUMNS[8], line, &mut issues),
        answer_ro: cell(record, columns.answer_ro).to_string(),
        answer_en: cell(record, columns.answer_en).to_string(),
        answer_weight: parse_weight(record, columns.answer_weight, COLUMNS[11], line, &mut issues),
    };
    ParsedRow { line, row, issues }
}

fn parse_id(
    record: &StringRecord,
    index: usize,
    column: &'static str,
    line: u64,
    issues: &mut Vec<RowIssue>,
) -> u64 {
    let value = cell(record, index);
    if value.is_empty() {
        return 0;
    }
    match value.parse::<u64>() {
        Ok(id) => id,
        Err(_) => {
            issues.push(RowIssue {
                row: line,
                column,
                message: format!("{column} must be a whole number, got '{value}'"),
            });
            0
        }
    }
}

fn parse_weight(
    record: &StringRecord,
    index: usize,
    column: &'static str,
    line: u64,
    issues: &mut Vec<RowIssue>,
) -> u8 {
    let value = cell(record, index);
    if value.is_empty() {
        return 0;
    }
    match value.parse::<u64>() {
        // Range enforcement happens in validation; cap so oversized values
        // still land there instead of failing the numeric coercion.
        Ok(weight) => weight.min(u64::from(u8::MAX)) as u8,
        Err(_) => {
            issues.push(RowIssue {
                row: line,
                column,
                message: format!("{column} must be a whole number, got '{value}'"),
            });
            0
        }
    }
}
