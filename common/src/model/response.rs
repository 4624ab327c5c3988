use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value given for a single question.
///
/// Checkbox questions submit a list of the selected option texts; every other
/// question type submits a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerValue {
    /// `true` for an empty string or an empty selection.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Single(value) => value.trim().is_empty(),
            AnswerValue::Multiple(values) => values.is_empty(),
        }
    }

    /// Individual values, one per selected option for multi-valued answers.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            AnswerValue::Single(value) => std::slice::from_ref(value),
            AnswerValue::Multiple(values) => values,
        };
        values.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: i64,
    pub answer: AnswerValue,
}

/// One respondent's submission. Never edited once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: i64,
    pub survey_id: i64,
    pub participant_email: Option<String>,
    pub answers: Vec<Answer>,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_value_accepts_string_or_list() {
        let single: AnswerValue = serde_json::from_str(r#""Yes""#).unwrap();
        assert_eq!(single, AnswerValue::Single("Yes".to_string()));

        let multiple: AnswerValue = serde_json::from_str(r#"["Red","Blue"]"#).unwrap();
        assert_eq!(multiple.values().collect::<Vec<_>>(), vec!["Red", "Blue"]);
    }

    #[test]
    fn blank_answers() {
        assert!(AnswerValue::Single("  ".to_string()).is_blank());
        assert!(AnswerValue::Multiple(Vec::new()).is_blank());
        assert!(!AnswerValue::Multiple(vec!["Red".to_string()]).is_blank());
    }
}
