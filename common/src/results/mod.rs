//! # Survey results aggregation
//!
//! Turns the stored responses of one survey into what the owner sees on the
//! results page. Everything here is a pure transform over data the caller has
//! already loaded, so it can run concurrently for the same survey without any
//! coordination.
//!
//! ## Pieces
//! - `index`: groups every submitted answer by question id, keeping the
//!   most-recent-first order of the responses it was given.
//! - `completion`: the share of responses that answered at least as many
//!   questions as the survey has.
//! - `display`: per-question rows for rendering, raw for free-text questions
//!   and frequency-sorted for choice questions. `SurveyResults::summary`
//!   carries them for every question of the survey.

mod completion;
mod display;
mod index;

pub use completion::compute_completion_rate;
pub use display::{aggregate_answers_for_display, DisplayRow};
pub use index::{build_answer_index, AnswerEntry, AnswerIndex};

use crate::model::question::QuestionType;
use crate::model::response::SurveyResponse;
use crate::model::survey::Survey;
use serde::Serialize;

/// Display rows of one survey question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionSummary {
    pub question_id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub rows: Vec<DisplayRow>,
}

/// Body of `GET /api/survey/{id}/results`.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyResults {
    pub survey: Survey,
    pub results: AnswerIndex,
    /// One entry per survey question, in question order.
    pub summary: Vec<QuestionSummary>,
    pub total_responses: usize,
    pub completion_rate: f64,
}

impl SurveyResults {
    /// Runs the aggregator over `responses`, which must be ordered newest first.
    pub fn build(survey: Survey, responses: &[SurveyResponse]) -> Self {
        let completion_rate = compute_completion_rate(&survey, responses);
        let results = build_answer_index(responses);
        let summary = survey
            .questions
            .iter()
            .map(|question| {
                let question_type = question.kind.question_type();
                QuestionSummary {
                    question_id: question.id,
                    question_type,
                    rows: aggregate_answers_for_display(question.id, question_type, &results),
                }
            })
            .collect();

        SurveyResults {
            results,
            summary,
            total_responses: responses.len(),
            completion_rate,
            survey,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{Question, QuestionKind, QuestionOption};
    use crate::model::response::{Answer, AnswerValue};
    use chrono::Utc;

    fn question(id: i64, kind: QuestionKind) -> Question {
        Question {
            id,
            survey_id: 1,
            question: format!("Question {id}"),
            description: None,
            kind,
        }
    }

    fn response(id: i64, answers: Vec<(i64, AnswerValue)>) -> SurveyResponse {
        SurveyResponse {
            id,
            survey_id: 1,
            participant_email: None,
            answers: answers
                .into_iter()
                .map(|(question_id, answer)| Answer { question_id, answer })
                .collect(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn summary_follows_question_order() {
        let now = Utc::now();
        let option = |text: &str| QuestionOption {
            uuid: text.to_lowercase(),
            text: text.to_string(),
        };
        let survey = Survey {
            id: 1,
            user_id: 1,
            title: "Lunch".to_string(),
            slug: "lunch".to_string(),
            status: true,
            description: None,
            image_url: None,
            expire_date: None,
            created_at: now,
            updated_at: now,
            questions: vec![
                question(20, QuestionKind::Checkbox { options: vec![option("Red"), option("Blue")] }),
                question(10, QuestionKind::Text),
            ],
        };
        let responses = vec![
            response(2, vec![(10, AnswerValue::Single("Tacos".into())), (20, AnswerValue::Multiple(vec!["Blue".into()]))]),
            response(1, vec![(20, AnswerValue::Multiple(vec!["Red".into(), "Blue".into()]))]),
        ];

        let results = SurveyResults::build(survey, &responses);

        assert_eq!(results.total_responses, 2);
        assert_eq!(results.completion_rate, 50.0);
        let ids: Vec<i64> = results.summary.iter().map(|s| s.question_id).collect();
        assert_eq!(ids, vec![20, 10]);
        assert_eq!(
            results.summary[0].rows,
            vec![
                DisplayRow { text: "Blue".to_string(), count: 2 },
                DisplayRow { text: "Red".to_string(), count: 1 },
            ]
        );
        assert_eq!(results.summary[1].question_type, QuestionType::Text);
        assert_eq!(results.summary[1].rows, vec![DisplayRow { text: "Tacos".to_string(), count: 1 }]);
    }
}
