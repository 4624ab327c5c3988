//! # Response Submission Service
//!
//! Backs `POST /api/survey/{survey_id}/answer`, the only endpoint respondents
//! call. No authentication is required.
//!
//! ## Workflow
//!
//! 1.  **Lookup**: the survey must exist (`404` otherwise).
//! 2.  **Validation**: `answers` must be a non-empty array whose entries carry an integer
//!     `question_id` and a non-empty `answer`; `participant_email` may be null but
//!     must look like an address when present. All problems are reported together
//!     as `422`.
//! 3.  **Availability**: drafts are rejected with "Survey is not active", surveys
//!     past their expiry date with "Survey has expired" (both `403`).
//! 4.  **Persistence**: the answers are stored verbatim with the current time and
//!     the created record is returned with `201`.
//!
//! Question ids are not checked against the survey's questions; the aggregator
//! indexes whatever ids were submitted.

use crate::db::{responses, surveys, Database};
use crate::error::{is_valid_email, ApiError, ValidationErrors};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::response::{Answer, SurveyResponse};
use common::model::survey::Availability;
use common::requests::SubmitResponseRequest;
use log::info;
use serde_json::json;

pub(crate) async fn process(
    db: web::Data<Database>,
    survey_id: web::Path<i64>,
    payload: web::Json<SubmitResponseRequest>,
) -> Result<HttpResponse, ApiError> {
    let result = submit_response(&db, survey_id.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Survey response submitted successfully",
        "data": result,
    })))
}

/// Answers and normalized email of a request that passed validation.
fn validate_submission(
    req: SubmitResponseRequest,
) -> Result<(Vec<Answer>, Option<String>), ApiError> {
    let mut errors = ValidationErrors::new();
    let mut answers = Vec::new();

    match req.answers {
        None => errors.add("answers", "The answers field is required."),
        Some(submitted) if submitted.is_empty() => {
            errors.add("answers", "The answers field is required.")
        }
        Some(submitted) => {
            for (idx, submitted) in submitted.into_iter().enumerate() {
                let question_id = match submitted.question_id.as_ref() {
                    None => {
                        errors.add(
                            format!("answers.{idx}.question_id"),
                            "The question id field is required.",
                        );
                        None
                    }
                    Some(raw) => {
                        let id = raw.as_integer();
                        if id.is_none() {
                            errors.add(
                                format!("answers.{idx}.question_id"),
                                "The question id must be an integer.",
                            );
                        }
                        id
                    }
                };

                let answer = submitted.answer.filter(|answer| !answer.is_blank());
                if answer.is_none() {
                    errors.add(
                        format!("answers.{idx}.answer"),
                        "The answer field is required.",
                    );
                }

                if let (Some(question_id), Some(answer)) = (question_id, answer) {
                    answers.push(Answer {
                        question_id,
                        answer,
                    });
                }
            }
        }
    }

    let participant_email = req
        .participant_email
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty());
    if let Some(email) = participant_email.as_deref() {
        if !is_valid_email(email) {
            errors.add(
                "participant_email",
                "The participant email must be a valid email address.",
            );
        }
    }

    errors.into_result()?;
    Ok((answers, participant_email))
}

async fn submit_response(
    db: &Database,
    survey_id: i64,
    req: SubmitResponseRequest,
) -> Result<SurveyResponse, ApiError> {
    let stored = db
        .run(move |conn| {
            let survey = surveys::find_survey(conn, survey_id)?.ok_or(ApiError::NotFound("Survey"))?;
            let (answers, participant_email) = validate_submission(req)?;

            let now = Utc::now();
            match survey.availability(now) {
                Availability::Open => {}
                Availability::Inactive => return Err(ApiError::SurveyInactive),
                Availability::Expired => return Err(ApiError::SurveyExpired),
            }

            responses::insert_response(conn, survey_id, participant_email.as_deref(), answers, now)
        })
        .await?;

    info!(
        "Stored response {} for survey {} ({} answers)",
        stored.id,
        survey_id,
        stored.answers.len()
    );
    Ok(stored)
}
