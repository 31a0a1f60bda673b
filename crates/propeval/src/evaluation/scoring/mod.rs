//! Pure scoring over the questionnaire hierarchy.
//!
//! The engine never touches storage and never mutates its inputs. Each
//! selection carries the weights captured at submission time, so hierarchy
//! edits after the fact cannot change a stored result.

mod tiers;

pub use tiers::{ScoreLevel, ScoreTier};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::hierarchy::{CategoryWithQuestions, LocalizedText};

/// One selected answer with the weights captured at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSelection {
    pub question_id: u64,
    pub answer_id: u64,
    pub question_weight: u8,
    pub answer_weight: u8,
}

impl AnswerSelection {
    /// Points contributed by this selection, fixed at submission time.
    pub fn points(&self) -> u32 {
        u32::from(self.answer_weight) * u32::from(self.question_weight)
    }
}

/// Per-category slice of an evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category_id: u64,
    pub category_name: LocalizedText,
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub answered_questions: usize,
    pub total_questions: usize,
}

/// Aggregate outcome returned to callers and snapshotted on the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub total_score: u32,
    pub max_possible_score: u32,
    pub percentage: f64,
    pub completion_rate: f64,
    pub level: ScoreLevel,
    pub badge: String,
    pub categories: Vec<CategoryBreakdown>,
}

/// Score a set of selections against one property type's hierarchy slice.
///
/// Per category, the maximum is the sum over questions of the heaviest
/// answer weight times the question weight; questions without answers
/// contribute nothing. Selections referencing questions outside the slice
/// are ignored. All percentage divisions guard against a zero maximum.
pub fn compute_result(
    categories: &[CategoryWithQuestions],
    selections: &[AnswerSelection],
) -> EvaluationResult {
    let mut by_question: HashMap<u64, &AnswerSelection> = HashMap::new();
    for selection in selections {
        by_question.insert(selection.question_id, selection);
    }

    let mut breakdowns = Vec::with_capacity(categories.len());
    let mut total_score = 0u32;
    let mut max_possible_score = 0u32;
    let mut answered_questions = 0usize;
    let mut total_questions = 0usize;

    for entry in categories {
        let mut category_score = 0u32;
        let mut category_max = 0u32;
        let mut answered = 0usize;

        for question in &entry.questions {
            let heaviest_answer = question
                .answers
                .iter()
                .map(|answer| u32::from(answer.weight))
                .max()
                .unwrap_or(0);
            category_max += heaviest_answer * u32::from(question.question.weight);

            if let Some(selection) = by_question.get(&question.question.id) {
                category_score += selection.points();
                answered += 1;
            }
        }

        total_score += category_score;
        max_possible_score += category_max;
        answered_questions += answered;
        total_questions += entry.questions.len();

        breakdowns.push(CategoryBreakdown {
            category_id: entry.category.id,
            category_name: entry.category.name.clone(),
            score: category_score,
            max_score: category_max,
            percentage: percentage_of(category_score, category_max),
            answered_questions: answered,
            total_questions: entry.questions.len(),
        });
    }

    let percentage = percentage_of(total_score, max_possible_score);
    let completion_rate = if total_questions == 0 {
        0.0
    } else {
        answered_questions as f64 / total_questions as f64 * 100.0
    };
    let tier = ScoreTier::from_percentage(percentage);

    EvaluationResult {
        total_score,
        max_possible_score,
        percentage,
        completion_rate,
        level: tier.level,
        badge: tier.badge.to_string(),
        categories: breakdowns,
    }
}

fn percentage_of(score: u32, max: u32) -> f64 {
    if max == 0 {
        0.0
    } else {
        f64::from(score) / f64::from(max) * 100.0
    }
}
