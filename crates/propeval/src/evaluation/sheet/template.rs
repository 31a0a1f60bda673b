use super::{SheetError, SheetRow, COLUMNS};
use crate::evaluation::hierarchy::{CategoryWithQuestions, PropertyType};

/// Worked example rows included in a template download.
const TEMPLATE_ROW_CAP: usize = 20;

const INSTRUCTIONS: &str = "Fill one row per answer. Keep the id values from an export to update existing records and use 0 to create new ones. Weights range from 1 to 10.";

/// Which sheet flavor to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemplateKind {
    #[default]
    Template,
    Export,
}

impl TemplateKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "template" => Some(Self::Template),
            "export" => Some(Self::Export),
            _ => None,
        }
    }

    pub const fn filename(self) -> &'static str {
        match self {
            Self::Template => "questions_template.csv",
            Self::Export => "questions_export.csv",
        }
    }
}

/// Render a property type's hierarchy as CSV bytes.
///
/// Templates carry the instructions row and a worked sample (existing rows
/// capped at [`TEMPLATE_ROW_CAP`], or two synthetic rows when the hierarchy
/// is empty). Exports carry every flattened row and nothing else, so feeding
/// an export back through the importer changes no records.
pub fn generate(
    kind: TemplateKind,
    property_type: &PropertyType,
    categories: &[CategoryWithQuestions],
) -> Result<Vec<u8>, SheetError> {
    let mut buffer = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buffer);
        writer.write_record(COLUMNS)?;

        let rows = flatten(property_type, categories);
        match kind {
            TemplateKind::Template => {
                writer.write_record(instructions_row())?;
                if rows.is_empty() {
                    for row in sample_rows(property_type) {
                        writer.serialize(row)?;
                    }
                } else {
                    for row in rows.iter().take(TEMPLATE_ROW_CAP) {
                        writer.serialize(row)?;
                    }
                }
            }
            TemplateKind::Export => {
                for row in &rows {
                    writer.serialize(row)?;
                }
            }
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(buffer)
}

/// One row per answer. Questions without answers are left out so the file
/// stays importable as-is.
fn flatten(property_type: &PropertyType, categories: &[CategoryWithQuestions]) -> Vec<SheetRow> {
    let mut rows = Vec::new();
    for entry in categories {
        for question in &entry.questions {
            for answer in &question.answers {
                rows.push(SheetRow {
                    property_type_id: property_type.id,
                    category_id: entry.category.id,
                    category_name_ro: entry.category.name.ro.clone(),
                    category_name_en: entry.category.name.en.clone(),
                    question_id: question.question.id,
                    question_ro: question.question.text.ro.clone(),
                    question_en: question.question.text.en.clone(),
                    question_weight: question.question.weight,
                    answer_id: answer.id,
                    answer_ro: answer.text.ro.clone(),
                    answer_en: answer.text.en.clone(),
                    answer_weight: answer.weight,
                });
            }
        }
    }
    rows
}

fn instructions_row() -> [&'static str; 12] {
    let mut row = [""; 12];
    row[0] = INSTRUCTIONS;
    row
}

/// Two rows sharing one new category and question, showing how repeated
/// text groups into a single question with several answers.
fn sample_rows(property_type: &PropertyType) -> [SheetRow; 2] {
    let base = SheetRow {
        property_type_id: property_type.id,
        category_name_ro: "Structura cladirii".to_string(),
        category_name_en: "Building structure".to_string(),
        question_ro: "Care este starea acoperisului?".to_string(),
        question_en: "What is the roof condition?".to_string(),
        question_weight: 5,
        ..SheetRow::default()
    };

    let mut first = base.clone();
    first.answer_ro = "Foarte buna".to_string();
    first.answer_en = "Very good".to_string();
    first.answer_weight = 10;

    let mut second = base;
    second.answer_ro = "Necesita reparatii".to_string();
    second.answer_en = "Needs repairs".to_string();
    second.answer_weight = 3;

    [first, second]
}
