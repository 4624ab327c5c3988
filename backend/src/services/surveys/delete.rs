use crate::auth::AuthenticatedUser;
use crate::db::{storage_url_in_use, surveys, Database};
use crate::error::ApiError;
use crate::services::surveys::owned_survey;
use crate::storage::Storage;
use actix_web::{web, HttpResponse};
use log::info;

/// Deletes the survey with its questions and responses, then its image file
/// when nothing else uses it.
pub(crate) async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    storage: web::Data<Storage>,
    survey_id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let survey_id = survey_id.into_inner();
    let stale_image = db
        .run(move |conn| {
            let survey = owned_survey(conn, survey_id, user.id)?;
            surveys::delete_survey(conn, survey_id)?;
            Ok(match survey.image_url {
                Some(url) if !storage_url_in_use(conn, &url)? => Some(url),
                _ => None,
            })
        })
        .await?;

    if let Some(url) = stale_image {
        storage.delete(&url).await?;
    }

    info!("Deleted survey {}", survey_id);
    Ok(HttpResponse::NoContent().finish())
}
