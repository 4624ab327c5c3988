use crate::auth::password::hash_password;
use crate::auth::new_token;
use crate::db::{users, Database};
use crate::error::{is_valid_email, ApiError, ValidationErrors, MAX_FIELD_CHARS};
use crate::services::auth::SessionBody;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::requests::SignupRequest;
use log::info;

pub(crate) async fn process(
    db: web::Data<Database>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = signup(&db, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(body))
}

async fn signup(db: &Database, req: SignupRequest) -> Result<SessionBody, ApiError> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_lowercase();

    let mut errors = ValidationErrors::new();
    if name.is_empty() {
        errors.add("name", "The name field is required.");
    } else if name.chars().count() > MAX_FIELD_CHARS {
        errors.add("name", "The name may not be greater than 255 characters.");
    }
    if email.is_empty() {
        errors.add("email", "The email field is required.");
    } else if !is_valid_email(&email) {
        errors.add("email", "The email must be a valid email address.");
    } else if email.chars().count() > MAX_FIELD_CHARS {
        errors.add("email", "The email may not be greater than 255 characters.");
    }
    if req.password.chars().count() < 8 {
        errors.add("password", "The password must be at least 8 characters.");
    } else if req.password != req.password_confirmation {
        errors.add("password", "The password confirmation does not match.");
    }

    let password = req.password;
    let token = new_token();
    let session_token = token.clone();

    let user = db
        .run(move |conn| {
            if !errors.contains("email") && users::email_taken(conn, &email, None)? {
                errors.add("email", "The email has already been taken.");
            }
            errors.into_result()?;

            let password_hash = hash_password(&password)?;
            let now = Utc::now();
            let user = users::insert_user(conn, &name, &email, &password_hash, now)?;
            users::create_session(conn, user.id, &session_token, now)?;
            Ok(user)
        })
        .await?;

    info!("Registered user {}", user.id);
    Ok(SessionBody { user, token })
}
