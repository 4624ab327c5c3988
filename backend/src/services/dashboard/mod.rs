use crate::auth::AuthenticatedUser;
use crate::db::{responses, surveys, Database};
use crate::error::ApiError;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};
use common::model::dashboard::Dashboard;

const API_PATH: &str = "/api/dashboard";

/// How many recent responses the dashboard lists.
const LATEST_ANSWERS: i64 = 5;

/// Configures the scope for `GET /api/dashboard`, the owner's overview.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(process))
}

async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> Result<HttpResponse, ApiError> {
    let dashboard = db
        .run(move |conn| {
            Ok(Dashboard {
                total_surveys: surveys::count_surveys(conn, user.id)?,
                latest_survey: surveys::latest_survey(conn, user.id)?,
                total_answers: responses::count_for_owner(conn, user.id)?,
                latest_answers: responses::latest_for_owner(conn, user.id, LATEST_ANSWERS)?,
            })
        })
        .await?;
    Ok(HttpResponse::Ok().json(dashboard))
}
