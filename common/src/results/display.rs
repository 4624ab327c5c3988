use crate::model::question::QuestionType;
use crate::model::response::AnswerValue;
use crate::results::index::AnswerIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of a question's results: an answer value and how often it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub text: String,
    pub count: usize,
}

/// Rows to render for `question_id`.
///
/// Free-text answers are listed one per response in index order. Choice
/// answers are tallied per value, each selected checkbox option counting
/// once, and sorted by count descending; equal counts keep the order in which
/// the value first appeared in the index.
pub fn aggregate_answers_for_display(
    question_id: i64,
    question_type: QuestionType,
    index: &AnswerIndex,
) -> Vec<DisplayRow> {
    let entries = index.get(question_id);

    if question_type.is_free_text() {
        return entries
            .iter()
            .map(|entry| DisplayRow {
                text: free_text(&entry.answer),
                count: 1,
            })
            .collect();
    }

    let mut rows: Vec<DisplayRow> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for value in entries.iter().flat_map(|entry| entry.answer.values()) {
        match positions.get(value) {
            Some(&position) => rows[position].count += 1,
            None => {
                positions.insert(value, rows.len());
                rows.push(DisplayRow {
                    text: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-occurrence order among ties.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

fn free_text(answer: &AnswerValue) -> String {
    match answer {
        AnswerValue::Single(value) => value.clone(),
        AnswerValue::Multiple(values) => values.join(", "),
    }
}
