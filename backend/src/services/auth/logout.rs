use crate::auth::AuthenticatedUser;
use crate::db::{users, Database};
use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub(crate) async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> Result<HttpResponse, ApiError> {
    let token = user.token;
    db.run(move |conn| Ok(users::delete_session(conn, &token)?))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
