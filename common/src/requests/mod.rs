//! JSON bodies accepted by the API.
//!
//! Required fields default to empty values instead of failing deserialization
//! so that the backend can report every missing field at once as a
//! validation error.

use crate::model::question::QuestionOption;
use crate::model::response::AnswerValue;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub new_password_confirmation: Option<String>,
}

/// Body of `POST /api/survey` and `PUT /api/survey/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: bool,
    pub description: Option<String>,
    /// A `data:image/...;base64,` URL to upload a new image. Any other value
    /// (typically the current image URL echoed back) leaves the image unchanged.
    pub image: Option<String>,
    /// RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
    pub expire_date: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionRequest {
    /// Present when editing a question that already exists.
    pub id: Option<i64>,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub question: String,
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

/// Question ids as sent by browsers, which often stringify object keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawQuestionId {
    Number(i64),
    Text(String),
}

impl RawQuestionId {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RawQuestionId::Number(id) => Some(*id),
            RawQuestionId::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: Option<RawQuestionId>,
    pub answer: Option<AnswerValue>,
}

/// Body of `POST /api/survey/{id}/answer`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponseRequest {
    pub answers: Option<Vec<SubmittedAnswer>>,
    pub participant_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_ids_accept_numeric_strings() {
        let body: SubmitResponseRequest = serde_json::from_str(
            r#"{"answers":[{"question_id":"12","answer":"Yes"},{"question_id":3,"answer":["a"]}]}"#,
        )
        .unwrap();
        let answers = body.answers.unwrap();
        assert_eq!(answers[0].question_id.as_ref().and_then(RawQuestionId::as_integer), Some(12));
        assert_eq!(answers[1].question_id.as_ref().and_then(RawQuestionId::as_integer), Some(3));
        assert_eq!(RawQuestionId::Text("abc".to_string()).as_integer(), None);
    }

    #[test]
    fn missing_survey_fields_default() {
        let body: SurveyRequest = serde_json::from_str("{}").unwrap();
        assert!(body.title.is_empty());
        assert!(!body.status);
        assert!(body.questions.is_empty());
    }
}
