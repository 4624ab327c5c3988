use crate::db::{surveys, Database};
use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::survey::Availability;
use serde_json::json;

/// Public read used by the shareable link. Drafts and expired surveys are
/// reported as missing so that their content is not exposed.
pub(crate) async fn process(
    db: web::Data<Database>,
    slug: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let slug = slug.into_inner();
    let survey = db
        .run(move |conn| Ok(surveys::find_survey_by_slug(conn, &slug)?))
        .await?
        .filter(|survey| survey.availability(Utc::now()) == Availability::Open)
        .ok_or(ApiError::NotFound("Survey"))?;
    Ok(HttpResponse::Ok().json(json!({ "data": survey })))
}
