use crate::auth::AuthenticatedUser;
use crate::db::{responses, Database};
use crate::error::ApiError;
use crate::services::surveys::owned_survey;
use actix_web::{web, HttpResponse};
use common::results::SurveyResults;
use log::info;

/// `GET /api/survey/{survey_id}/results`, owner only.
pub(crate) async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    survey_id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let survey_id = survey_id.into_inner();
    let results = db
        .run(move |conn| {
            let survey = owned_survey(conn, survey_id, user.id)?;
            let responses = responses::responses_for_survey(conn, survey_id)?;
            Ok(SurveyResults::build(survey, &responses))
        })
        .await?;

    info!(
        "Served results for survey {}: {} responses, {}% complete",
        survey_id, results.total_responses, results.completion_rate
    );
    Ok(HttpResponse::Ok().json(results))
}
