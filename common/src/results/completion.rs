use crate::model::response::SurveyResponse;
use crate::model::survey::Survey;

/// Percentage of `responses` that count as complete, rounded to two decimals.
///
/// A response is complete when it holds at least as many answers as the
/// survey has questions. Only the count is compared: a response that answers
/// one question twice can be complete while skipping another one.
///
/// Returns `0.0` without responses and `100.0` for a survey without questions.
pub fn compute_completion_rate(survey: &Survey, responses: &[SurveyResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }

    let total_questions = survey.questions.len();
    if total_questions == 0 {
        return 100.0;
    }

    let complete = responses
        .iter()
        .filter(|response| response.answers.len() >= total_questions)
        .count();

    percent_in_hundredths(complete, responses.len())
}

/// `complete / total * 100` rounded half-up to two decimals. The rounding
/// happens on integer hundredths so exact ties such as 14.375 round up.
fn percent_in_hundredths(complete: usize, total: usize) -> f64 {
    let (complete, total) = (complete as u64, total as u64);
    let hundredths = (complete * 20_000 + total) / (2 * total);
    hundredths as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{Question, QuestionKind};
    use crate::model::response::{Answer, AnswerValue};
    use chrono::Utc;

    fn survey_with_questions(count: i64) -> Survey {
        let now = Utc::now();
        Survey {
            id: 1,
            user_id: 1,
            title: "Onboarding feedback".to_string(),
            slug: "onboarding-feedback".to_string(),
            status: true,
            description: None,
            image_url: None,
            expire_date: None,
            created_at: now,
            updated_at: now,
            questions: (1..=count)
                .map(|id| Question {
                    id,
                    survey_id: 1,
                    question: format!("Question {id}"),
                    description: None,
                    kind: QuestionKind::Text,
                })
                .collect(),
        }
    }

    fn response_with_answers(question_ids: &[i64]) -> SurveyResponse {
        SurveyResponse {
            id: 1,
            survey_id: 1,
            participant_email: None,
            answers: question_ids
                .iter()
                .map(|&question_id| Answer {
                    question_id,
                    answer: AnswerValue::Single("ok".to_string()),
                })
                .collect(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn no_responses_is_zero() {
        assert_eq!(compute_completion_rate(&survey_with_questions(3), &[]), 0.0);
        assert_eq!(compute_completion_rate(&survey_with_questions(0), &[]), 0.0);
    }

    #[test]
    fn survey_without_questions_is_fully_complete() {
        let responses: Vec<_> = (0..5).map(|_| response_with_answers(&[])).collect();
        assert_eq!(compute_completion_rate(&survey_with_questions(0), &responses), 100.0);
    }

    #[test]
    fn half_of_responses_complete() {
        let responses = vec![
            response_with_answers(&[1, 2, 3]),
            response_with_answers(&[1, 2]),
        ];
        assert_eq!(compute_completion_rate(&survey_with_questions(3), &responses), 50.0);
    }

    #[test]
    fn rounds_to_two_decimals() {
        let responses = vec![
            response_with_answers(&[1, 2]),
            response_with_answers(&[1]),
            response_with_answers(&[]),
        ];
        let rate = compute_completion_rate(&survey_with_questions(2), &responses);
        assert_eq!(rate, 33.33);
        assert_eq!(rate, compute_completion_rate(&survey_with_questions(2), &responses));

        let two_of_three = vec![
            response_with_answers(&[1, 2]),
            response_with_answers(&[1, 2]),
            response_with_answers(&[]),
        ];
        assert_eq!(compute_completion_rate(&survey_with_questions(2), &two_of_three), 66.67);
    }

    #[test]
    fn exact_ties_round_up() {
        let survey = survey_with_questions(1);
        let responses: Vec<_> = (0..160)
            .map(|i| {
                let answers: &[i64] = if i < 23 { &[1] } else { &[] };
                response_with_answers(answers)
            })
            .collect();
        assert_eq!(compute_completion_rate(&survey, &responses), 14.38);

        assert_eq!(percent_in_hundredths(41, 160), 25.63);
        assert_eq!(percent_in_hundredths(51, 160), 31.88);
        assert_eq!(percent_in_hundredths(1, 8), 12.5);
        assert_eq!(percent_in_hundredths(7, 7), 100.0);
    }

    #[test]
    fn completeness_counts_answers_not_question_ids() {
        // Question 2 is skipped, question 1 answered twice.
        let responses = vec![response_with_answers(&[1, 1])];
        assert_eq!(compute_completion_rate(&survey_with_questions(2), &responses), 100.0);

        let extra = vec![response_with_answers(&[1, 2, 99])];
        assert_eq!(compute_completion_rate(&survey_with_questions(2), &extra), 100.0);
    }
}
