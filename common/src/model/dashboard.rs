use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary shown on the owner's landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_surveys: i64,
    pub latest_survey: Option<LatestSurvey>,
    pub total_answers: i64,
    pub latest_answers: Vec<LatestAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSurvey {
    pub id: i64,
    pub title: String,
    pub image_url: Option<String>,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub expire_date: Option<DateTime<Utc>>,
    /// Number of questions.
    pub questions: i64,
    /// Number of submitted responses.
    pub answers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestAnswer {
    pub id: i64,
    pub survey: SurveyRef,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRef {
    pub id: i64,
    pub title: String,
}
