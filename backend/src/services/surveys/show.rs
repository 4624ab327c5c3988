use crate::auth::AuthenticatedUser;
use crate::db::Database;
use crate::error::ApiError;
use crate::services::surveys::owned_survey;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub(crate) async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    survey_id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let survey_id = survey_id.into_inner();
    let survey = db
        .run(move |conn| owned_survey(conn, survey_id, user.id))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "data": survey })))
}
