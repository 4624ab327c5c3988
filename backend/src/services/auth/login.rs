use crate::auth::new_token;
use crate::auth::password::verify_password;
use crate::db::{users, Database};
use crate::error::{ApiError, ValidationErrors};
use crate::services::auth::SessionBody;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::requests::LoginRequest;
use log::{info, warn};

pub(crate) async fn process(
    db: web::Data<Database>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = login(&db, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(body))
}

async fn login(db: &Database, req: LoginRequest) -> Result<SessionBody, ApiError> {
    let email = req.email.trim().to_lowercase();

    let mut errors = ValidationErrors::new();
    if email.is_empty() {
        errors.add("email", "The email field is required.");
    }
    if req.password.is_empty() {
        errors.add("password", "The password field is required.");
    }
    errors.into_result()?;

    let token = new_token();
    let session_token = token.clone();
    let user = db
        .run(move |conn| {
            let Some((user, stored)) = users::find_credentials(conn, &email)? else {
                return Err(ApiError::InvalidCredentials);
            };
            if !verify_password(&req.password, &stored) {
                return Err(ApiError::InvalidCredentials);
            }
            users::create_session(conn, user.id, &session_token, Utc::now())?;
            Ok(user)
        })
        .await
        .inspect_err(|e| {
            if matches!(e, ApiError::InvalidCredentials) {
                warn!("Rejected login attempt");
            }
        })?;

    info!("User {} logged in", user.id);
    Ok(SessionBody { user, token })
}
