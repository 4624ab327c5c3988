use crate::auth::AuthenticatedUser;
use crate::db::{surveys, Database};
use crate::error::ApiError;
use crate::services::surveys::slug::slugify;
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
    payload: web::Json<SurveyRequest>,
) -> Result<HttpResponse, ApiError> {
    let survey = create_survey(&db, &storage, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "data": survey })))
}

/// Validates the request, stores the uploaded image if any, and inserts the
/// survey under a fresh unique slug.
async fn create_survey(
    db: &Database,
    storage: &Storage,
    user_id: i64,
    req: SurveyRequest,
) -> Result<Survey, ApiError> {
    let ValidatedSurvey { draft, image } = validate_survey(&req, Utc::now())?;

    let image_url = match image {
        Some(image) => Some(storage.store(SURVEY_IMAGES, image.extension, &image.bytes).await?),
        None => None,
    };

    let slug = slugify(&draft.title);
    let survey = db
        .run(move |conn| {
            let id = surveys::insert_survey(conn, user_id, &slug, image_url.as_deref(), &draft, Utc::now())?;
            surveys::find_survey(conn, id)?.ok_or(ApiError::NotFound("Survey"))
        })
        .await?;

    info!("User {} created survey {} ({})", user_id, survey.id, survey.slug);
    Ok(survey)
}
