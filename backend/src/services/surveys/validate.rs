//! Turns a `SurveyRequest` into a `SurveyDraft` plus an optional decoded
//! image, collecting every problem into one 422 response.

use crate::db::surveys::{QuestionDraft, SurveyDraft};
use crate::error::{ApiError, ValidationErrors};
use crate::storage::{decode_data_url, is_data_url, DecodedImage};
use chrono::{DateTime, NaiveDate, Utc};
use common::model::question::{QuestionKind, QuestionType};
use common::requests::{QuestionRequest, SurveyRequest};

const MAX_TITLE_CHARS: usize = 1000;
const MAX_QUESTION_CHARS: usize = 2000;

/// A request that passed validation.
#[derive(Debug)]
pub(crate) struct ValidatedSurvey {
    pub(crate) draft: SurveyDraft,
    /// A newly uploaded image; `None` keeps whatever the survey has.
    pub(crate) image: Option<DecodedImage>,
}

pub(crate) fn validate_survey(
    req: &SurveyRequest,
    now: DateTime<Utc>,
) -> Result<ValidatedSurvey, ApiError> {
    let mut errors = ValidationErrors::new();

    let title = req.title.trim().to_string();
    if title.is_empty() {
        errors.add("title", "The title field is required.");
    } else if title.chars().count() > MAX_TITLE_CHARS {
        errors.add("title", "The title may not be greater than 1000 characters.");
    }

    let expire_date = match req.expire_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match parse_expire_date(raw) {
            Some(date) if date > now => Some(date),
            Some(_) => {
                errors.add("expire_date", "The expire date must be a date after today.");
                None
            }
            None => {
                errors.add("expire_date", "The expire date is not a valid date.");
                None
            }
        },
    };

    let image = match req.image.as_deref() {
        Some(value) if is_data_url(value) => match decode_data_url(value) {
            Ok(image) => Some(image),
            Err(message) => {
                errors.add("image", message);
                None
            }
        },
        _ => None,
    };

    let questions = req
        .questions
        .iter()
        .enumerate()
        .filter_map(|(idx, question)| validate_question(idx, question, &mut errors))
        .collect();

    errors.into_result()?;

    Ok(ValidatedSurvey {
        draft: SurveyDraft {
            title,
            status: req.status,
            description: non_blank(req.description.as_deref()),
            expire_date,
            questions,
        },
        image,
    })
}

fn validate_question(
    idx: usize,
    req: &QuestionRequest,
    errors: &mut ValidationErrors,
) -> Option<QuestionDraft> {
    let field = |name: &str| format!("questions.{idx}.{name}");

    let text = req.question.trim();
    if text.is_empty() {
        errors.add(field("question"), "The question field is required.");
    } else if text.chars().count() > MAX_QUESTION_CHARS {
        errors.add(field("question"), "The question may not be greater than 2000 characters.");
    }

    let question_type = match req.question_type.parse::<QuestionType>() {
        Ok(question_type) => Some(question_type),
        Err(_) => {
            errors.add(
                field("type"),
                "The type must be one of: text, textarea, select, radio, checkbox.",
            );
            None
        }
    };

    if let Some(question_type) = question_type {
        if !question_type.is_free_text() {
            if req.options.is_empty() {
                errors.add(field("options"), "Choice questions need at least one option.");
            }
            if req.options.iter().any(|option| option.text.trim().is_empty()) {
                errors.add(field("options"), "Options may not be empty.");
            }
        }
    }

    let question_type = question_type?;
    Some(QuestionDraft {
        id: req.id,
        question: text.to_string(),
        description: non_blank(req.description.as_deref()),
        kind: QuestionKind::new(question_type, req.options.clone()),
    })
}

/// Accepts an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
fn parse_expire_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use common::model::question::QuestionOption;

    fn question(question_type: &str, text: &str, options: &[&str]) -> QuestionRequest {
        QuestionRequest {
            id: None,
            question_type: question_type.to_string(),
            question: text.to_string(),
            description: None,
            options: options
                .iter()
                .map(|text| QuestionOption {
                    uuid: format!("uuid-{text}"),
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    fn field_errors(err: ApiError) -> ValidationErrors {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_a_complete_survey() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let req = SurveyRequest {
            title: "  Team lunch ".to_string(),
            status: true,
            description: Some("   ".to_string()),
            expire_date: Some("2024-06-01".to_string()),
            questions: vec![
                question("text", "Name?", &["ignored"]),
                question("radio", "Pizza?", &["Yes", "No"]),
            ],
            ..Default::default()
        };

        let draft = validate_survey(&req, now).unwrap().draft;

        assert_eq!(draft.title, "Team lunch");
        assert_eq!(draft.description, None);
        assert_eq!(draft.expire_date, Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        assert_eq!(draft.questions[0].kind, QuestionKind::Text);
        assert_eq!(draft.questions[1].kind.options().len(), 2);
    }

    #[test]
    fn reports_every_invalid_field() {
        let now = Utc::now();
        let req = SurveyRequest {
            expire_date: Some((now - Duration::days(1)).to_rfc3339()),
            questions: vec![question("dropdown", "", &[]), question("checkbox", "Colours?", &[])],
            ..Default::default()
        };

        let errors = field_errors(validate_survey(&req, now).unwrap_err());

        assert!(errors.contains("title"));
        assert!(errors.contains("expire_date"));
        assert!(errors.contains("questions.0.type"));
        assert!(errors.contains("questions.0.question"));
        assert!(errors.contains("questions.1.options"));
    }

    #[test]
    fn decodes_uploaded_images_and_ignores_existing_urls() {
        let upload = SurveyRequest {
            title: "T".to_string(),
            image: Some(crate::storage::tests::pixel_gif_data_url()),
            ..Default::default()
        };
        let validated = validate_survey(&upload, Utc::now()).unwrap();
        assert_eq!(validated.image.map(|i| i.extension), Some("gif"));

        let unchanged = SurveyRequest {
            title: "T".to_string(),
            image: Some("/storage/surveys/abc.png".to_string()),
            ..Default::default()
        };
        assert!(validate_survey(&unchanged, Utc::now()).unwrap().image.is_none());

        let broken = SurveyRequest {
            title: "T".to_string(),
            image: Some("data:image/tiff;base64,AAAA".to_string()),
            ..Default::default()
        };
        let errors = field_errors(validate_survey(&broken, Utc::now()).unwrap_err());
        assert!(errors.contains("image"));
    }

    #[test]
    fn rejects_unparseable_dates() {
        let req = SurveyRequest {
            title: "T".to_string(),
            expire_date: Some("next tuesday".to_string()),
            ..Default::default()
        };
        let errors = field_errors(validate_survey(&req, Utc::now()).unwrap_err());
        assert!(errors.contains("expire_date"));
    }
}
