use crate::auth::AuthenticatedUser;
use crate::db::{storage_url_in_use, surveys, Database};
use crate::error::ApiError;
use crate::services::surveys::owned_survey;
use crate::services::surveys::validate::{validate_survey, ValidatedSurvey};
use crate::storage::{Storage, SURVEY_IMAGES};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::survey::Survey;
use common::requests::SurveyRequest;
use log::info;
use serde_json::json;

pub(crate) async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    storage: web::Data<Storage>,
    survey_id: web::Path<i64>,
    payload: web::Json<SurveyRequest>,
) -> Result<HttpResponse, ApiError> {
    let survey = update_survey(
        &db,
        &storage,
        user.id,
        survey_id.into_inner(),
        payload.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "data": survey })))
}

/// Applies an edit from the owner.
///
/// The slug never changes. A new image replaces the old one, whose file is
/// removed once no other row references it.
async fn update_survey(
    db: &Database,
    storage: &Storage,
    user_id: i64,
    survey_id: i64,
    req: SurveyRequest,
) -> Result<Survey, ApiError> {
    let current = db
        .run(move |conn| owned_survey(conn, survey_id, user_id))
        .await?;
    let ValidatedSurvey { draft, image } = validate_survey(&req, Utc::now())?;

    let new_image_url = match image {
        Some(image) => Some(storage.store(SURVEY_IMAGES, image.extension, &image.bytes).await?),
        None => None,
    };
    let old_image_url = current.image_url;

    let (survey, stale_image) = db
        .run(move |conn| {
            let image_url = new_image_url.as_deref().or(old_image_url.as_deref());
            surveys::update_survey(conn, survey_id, image_url, &draft, Utc::now())?;

            let stale_image = match (new_image_url.as_deref(), old_image_url.as_deref()) {
                (Some(new), Some(old)) if new != old && !storage_url_in_use(conn, old)? => {
                    Some(old.to_string())
                }
                _ => None,
            };
            let survey = surveys::find_survey(conn, survey_id)?.ok_or(ApiError::NotFound("Survey"))?;
            Ok((survey, stale_image))
        })
        .await?;

    if let Some(url) = stale_image {
        storage.delete(&url).await?;
    }

    info!("User {} updated survey {}", user_id, survey_id);
    Ok(survey)
}
