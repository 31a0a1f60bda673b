use crate::infra::{parse_sheet_kind, Platform, DEMO_ADMIN_TOKEN, DEMO_USER_ID, DEMO_USER_TOKEN};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use propeval::error::AppError;
use propeval::evaluation::hierarchy::CategoryWithQuestions;
use propeval::evaluation::import::{preflight, BulkImportError, ImportLimits};
use propeval::evaluation::scoring::AnswerSelection;
use propeval::evaluation::sessions::{EvaluationSubmission, PropertyInfo};
use propeval::evaluation::sheet::{SheetRow, TemplateKind};
use propeval::evaluation::StoreError;

#[derive(Args, Debug)]
pub(crate) struct TemplateArgs {
    /// Sheet kind to produce: "template" or "export"
    #[arg(long, default_value = "template", value_parser = parse_sheet_kind)]
    pub(crate) kind: TemplateKind,
    /// Output file (defaults to the sheet's standard filename)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Question sheet to read (CSV)
    pub(crate) file: PathBuf,
    /// Rewrite text and weights of records named by nonzero ids
    #[arg(long)]
    pub(crate) replace: bool,
    /// Validate the sheet and report row issues without applying anything
    #[arg(long)]
    pub(crate) check: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the full template sheet instead of a preview
    #[arg(long)]
    pub(crate) show_sheet: bool,
    /// Skip the evaluation submission portion of the walkthrough
    #[arg(long)]
    pub(crate) skip_evaluation: bool,
}

pub(crate) fn run_template(args: TemplateArgs) -> Result<(), AppError> {
    let TemplateArgs { kind, output } = args;
    let platform = Platform::seeded(ImportLimits::default())?;

    let Some(sheet) = platform
        .import
        .generate_sheet(kind, platform.demo_property_type.id)?
    else {
        return Err(AppError::Store(StoreError::NotFound));
    };

    let path = output.unwrap_or_else(|| PathBuf::from(sheet.filename));
    fs::write(&path, &sheet.bytes)?;
    println!("Wrote {} ({} bytes)", path.display(), sheet.bytes.len());
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs {
        file,
        replace,
        check,
    } = args;
    let platform = Platform::seeded(ImportLimits::default())?;
    println!(
        "Seeded demo hierarchy; property type '{}' has id {}",
        platform.demo_property_type.name.ro, platform.demo_property_type.id
    );

    if check {
        let reader = fs::File::open(&file)?;
        let report = preflight(reader).map_err(BulkImportError::from)?;
        println!(
            "Preflight: {} valid rows, {} invalid rows",
            report.valid.len(),
            report.invalid.len()
        );
        for invalid in &report.invalid {
            for issue in &invalid.issues {
                println!("- row {}: {}: {}", issue.row, issue.column, issue.message);
            }
        }
        return Ok(());
    }

    let outcome = platform.import.import_path(&file, replace)?;
    println!(
        "Categories: {} created, {} updated",
        outcome.categories_created, outcome.categories_updated
    );
    println!(
        "Questions: {} created, {} updated ({} rows dropped)",
        outcome.questions_created, outcome.questions_updated, outcome.rows_dropped
    );
    println!(
        "Answers: {} created, {} updated",
        outcome.answers_created, outcome.answers_updated
    );
    if outcome.failed > 0 {
        println!("Failures ({}):", outcome.failed);
        for failure in &outcome.details {
            println!("- {}: {}", failure.name, failure.error);
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        show_sheet,
        skip_evaluation,
    } = args;

    let platform = Platform::seeded(ImportLimits::default())?;
    println!("Property evaluation demo");
    println!("Demo tokens: admin '{DEMO_ADMIN_TOKEN}', user '{DEMO_USER_TOKEN}'");

    let property_type = &platform.demo_property_type;
    println!(
        "\nSeeded property type '{}' / '{}' (id {})",
        property_type.name.ro, property_type.name.en, property_type.id
    );
    let tree = match platform.hierarchy.property_tree(property_type.id) {
        Ok(tree) => tree,
        Err(err) => {
            println!("  Hierarchy unavailable: {}", err);
            return Ok(());
        }
    };
    render_hierarchy(&tree);

    println!("\nQuestion sheet template");
    match platform
        .import
        .generate_sheet(TemplateKind::Template, property_type.id)?
    {
        Some(sheet) => render_sheet(&sheet.bytes, show_sheet),
        None => println!("  Template unavailable: property type missing"),
    }

    println!("\nBulk import: adding a finishes category from sheet rows");
    let outcome = platform.import.import(finishes_rows(property_type.id), false)?;
    println!(
        "- {} category, {} question and {} answers created ({} failures)",
        outcome.categories_created,
        outcome.questions_created,
        outcome.answers_created,
        outcome.failed
    );

    let tree = match platform.hierarchy.property_tree(property_type.id) {
        Ok(tree) => tree,
        Err(err) => {
            println!("  Hierarchy unavailable: {}", err);
            return Ok(());
        }
    };
    println!("- hierarchy now holds {} categories", tree.len());

    if skip_evaluation {
        return Ok(());
    }

    println!("\nEvaluation walkthrough (runner-up answer picked per question)");
    let selections = demo_selections(&tree);
    let submission = EvaluationSubmission {
        property_type_id: property_type.id,
        property: PropertyInfo {
            name: "Apartament Pipera".to_string(),
            location: Some("Bucuresti".to_string()),
            surface: Some("72 mp".to_string()),
            floors: None,
            construction_year: Some("2009".to_string()),
        },
        answers: selections,
    };
    let outcome = match platform.sessions.submit(DEMO_USER_ID, submission) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- scored {}/{} points ({:.1}%) -> {} '{}'",
        outcome.result.total_score,
        outcome.result.max_possible_score,
        outcome.result.percentage,
        outcome.session.level.label(),
        outcome.session.badge
    );
    for category in &outcome.result.categories {
        println!(
            "  - {}: {}/{} ({}/{} questions answered)",
            category.category_name.ro,
            category.score,
            category.max_score,
            category.answered_questions,
            category.total_questions
        );
    }

    let record = match platform.sessions.get(outcome.session.id) {
        Ok(record) => record,
        Err(err) => {
            println!("  Session lookup failed: {}", err);
            return Ok(());
        }
    };
    match serde_json::to_string_pretty(&record) {
        Ok(json) => println!("\nStored session payload:\n{}", json),
        Err(err) => println!("  Session payload unavailable: {}", err),
    }

    let renamed = PropertyInfo {
        name: "Apartament Pipera renovat".to_string(),
        location: Some("Bucuresti".to_string()),
        surface: Some("72 mp".to_string()),
        floors: None,
        construction_year: Some("2009".to_string()),
    };
    match platform
        .sessions
        .update_property_info(outcome.session.id, renamed)
    {
        Ok(updated) => println!(
            "\nProperty details renamed to '{}'; stored score still {}",
            updated.session.property.name, updated.session.total_score
        ),
        Err(err) => println!("  Property update failed: {}", err),
    }

    Ok(())
}

fn render_hierarchy(tree: &[CategoryWithQuestions]) {
    for entry in tree {
        println!(
            "- {} / {}: {} questions",
            entry.category.name.ro,
            entry.category.name.en,
            entry.questions.len()
        );
        for question in &entry.questions {
            println!(
                "  - [w{}] {} ({} answers)",
                question.question.weight,
                question.question.text.ro,
                question.answers.len()
            );
        }
    }
}

fn render_sheet(bytes: &[u8], full: bool) {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().collect();
    let shown = if full { lines.len() } else { lines.len().min(3) };
    for line in &lines[..shown] {
        println!("  {}", line);
    }
    if shown < lines.len() {
        println!("  ... {} more rows", lines.len() - shown);
    }
}

/// Sheet rows introducing one new category with a single question, the way
/// an admin upload would.
fn finishes_rows(property_type_id: u64) -> Vec<SheetRow> {
    let answers = [
        ("Renovat recent", "Recently renovated", 10),
        ("Standard", "Standard", 6),
        ("Necesita renovare", "Needs renovation", 2),
    ];
    answers
        .into_iter()
        .map(|(answer_ro, answer_en, answer_weight)| SheetRow {
            property_type_id,
            category_name_ro: "Finisaje".to_string(),
            category_name_en: "Finishes".to_string(),
            question_ro: "Care este starea finisajelor interioare?".to_string(),
            question_en: "What is the condition of the interior finishes?".to_string(),
            question_weight: 4,
            answer_ro: answer_ro.to_string(),
            answer_en: answer_en.to_string(),
            answer_weight,
            ..SheetRow::default()
        })
        .collect()
}

/// Pick the runner-up answer for every question so the walkthrough lands
/// in a middle scoring band.
fn demo_selections(tree: &[CategoryWithQuestions]) -> Vec<AnswerSelection> {
    let mut selections = Vec::new();
    for entry in tree {
        for question in &entry.questions {
            let mut answers: Vec<_> = question.answers.iter().collect();
            answers.sort_by(|left, right| right.weight.cmp(&left.weight));
            let Some(pick) = answers.get(1).or_else(|| answers.first()) else {
                continue;
            };
            selections.push(AnswerSelection {
                question_id: question.question.id,
                answer_id: pick.id,
                question_weight: question.question.weight,
                answer_weight: pick.weight,
            });
        }
    }
    selections
}
