use crate::auth::AuthenticatedUser;
use crate::db::{surveys, Database};
use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// `GET /api/survey`: the caller's surveys, newest first, without questions.
pub(crate) async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> Result<HttpResponse, ApiError> {
    let list = db
        .run(move |conn| Ok(surveys::list_surveys(conn, user.id)?))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "data": list })))
}
