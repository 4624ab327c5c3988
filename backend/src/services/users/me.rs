use crate::auth::AuthenticatedUser;
use crate::db::{users, Database};
use crate::error::ApiError;
use actix_web::{web, HttpResponse};

pub(crate) async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> Result<HttpResponse, ApiError> {
    let profile = db
        .run(move |conn| users::find_user(conn, user.id)?.ok_or(ApiError::NotFound("User")))
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
