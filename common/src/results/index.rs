use crate::model::response::{AnswerValue, SurveyResponse};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// A single answer tagged with the time its response was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerEntry {
    pub question_id: i64,
    pub answer: AnswerValue,
    pub submitted_at: DateTime<Utc>,
}

/// Answers grouped by question id.
///
/// Groups appear in the order their question id was first seen and each group
/// keeps the order of the responses it was built from. Serializes as a JSON
/// object keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerIndex {
    groups: Vec<(i64, Vec<AnswerEntry>)>,
    positions: HashMap<i64, usize>,
}

impl AnswerIndex {
    fn push(&mut self, entry: AnswerEntry) {
        let position = match self.positions.get(&entry.question_id) {
            Some(&position) => position,
            None => {
                self.groups.push((entry.question_id, Vec::new()));
                let position = self.groups.len() - 1;
                self.positions.insert(entry.question_id, position);
                position
            }
        };
        self.groups[position].1.push(entry);
    }

    /// Answers for `question_id`, empty when nobody answered it.
    pub fn get(&self, question_id: i64) -> &[AnswerEntry] {
        self.positions
            .get(&question_id)
            .map(|&position| self.groups[position].1.as_slice())
            .unwrap_or(&[])
    }

    /// Question ids in first-seen order.
    pub fn question_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.groups.iter().map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &[AnswerEntry])> {
        self.groups
            .iter()
            .map(|(id, entries)| (*id, entries.as_slice()))
    }

    /// Number of distinct question ids.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of answers across all groups.
    pub fn total_answers(&self) -> usize {
        self.groups.iter().map(|(_, entries)| entries.len()).sum()
    }
}

impl Serialize for AnswerIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (question_id, entries) in &self.groups {
            map.serialize_entry(question_id, entries)?;
        }
        map.end()
    }
}

/// Groups every answer of `responses` by question id.
///
/// Ids that belong to no question of the survey are indexed like any other;
/// referential integrity is checked when responses are written, not here.
pub fn build_answer_index(responses: &[SurveyResponse]) -> AnswerIndex {
    let mut index = AnswerIndex::default();
    for response in responses {
        for answer in &response.answers {
            index.push(AnswerEntry {
                question_id: answer.question_id,
                answer: answer.answer.clone(),
                submitted_at: response.submitted_at,
            });
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::response::Answer;
    use chrono::{Duration, TimeZone};

    fn response(id: i64, minutes: i64, answers: &[(i64, &str)]) -> SurveyResponse {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        SurveyResponse {
            id,
            survey_id: 1,
            participant_email: None,
            answers: answers
                .iter()
                .map(|(question_id, value)| Answer {
                    question_id: *question_id,
                    answer: AnswerValue::Single(value.to_string()),
                })
                .collect(),
            submitted_at: base + Duration::minutes(minutes),
        }
    }

    #[test]
    fn empty_input_yields_empty_index() {
        let index = build_answer_index(&[]);
        assert!(index.is_empty());
        assert!(index.get(1).is_empty());
    }

    #[test]
    fn groups_keep_first_seen_key_order_and_response_order() {
        let responses = vec![
            response(2, 10, &[(5, "late"), (3, "b")]),
            response(1, 0, &[(3, "a"), (9, "foreign")]),
        ];

        let index = build_answer_index(&responses);

        assert_eq!(index.question_ids().collect::<Vec<_>>(), vec![5, 3, 9]);
        let for_three: Vec<_> = index.get(3).iter().map(|e| e.answer.clone()).collect();
        assert_eq!(
            for_three,
            vec![
                AnswerValue::Single("b".to_string()),
                AnswerValue::Single("a".to_string())
            ]
        );
        assert_eq!(index.get(3)[0].submitted_at, responses[0].submitted_at);
        assert_eq!(index.get(9).len(), 1);
    }

    #[test]
    fn no_answer_is_lost_or_duplicated() {
        let responses = vec![
            response(3, 20, &[(1, "x"), (1, "dup"), (2, "y")]),
            response(2, 10, &[]),
            response(1, 0, &[(2, "z")]),
        ];
        let expected: usize = responses.iter().map(|r| r.answers.len()).sum();

        let index = build_answer_index(&responses);

        assert_eq!(index.total_answers(), expected);
        assert_eq!(index.get(1).len(), 2);
    }

    #[test]
    fn serializes_as_object_keyed_by_question_id() {
        let index = build_answer_index(&[response(1, 0, &[(4, "Yes")])]);
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["4"][0]["answer"], "Yes");
        assert_eq!(json["4"][0]["question_id"], 4);
    }
}
