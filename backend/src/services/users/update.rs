use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthenticatedUser;
use crate::db::{users, Database};
use crate::error::{is_valid_email, ApiError, ValidationErrors, MAX_FIELD_CHARS};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::user::User;
use common::requests::UpdateProfileRequest;
use log::info;
use serde_json::json;

pub(crate) async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let updated = update_profile(&db, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully",
        "user": updated,
    })))
}

/// Updates name and email, and the password when `new_password` is given.
///
/// Changing the password requires the current one; a wrong current password
/// is reported on the `current_password` field.
async fn update_profile(
    db: &Database,
    user_id: i64,
    req: UpdateProfileRequest,
) -> Result<User, ApiError> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_lowercase();
    let new_password = req.new_password.filter(|p| !p.is_empty());
    let current_password = req.current_password.filter(|p| !p.is_empty());

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
    if let Some(new_password) = new_password.as_deref() {
        if current_password.is_none() {
            errors.add(
                "current_password",
                "The current password field is required when new password is present.",
            );
        }
        if new_password.chars().count() < 8 {
            errors.add("new_password", "The new password must be at least 8 characters.");
        } else if req.new_password_confirmation.as_deref() != Some(new_password) {
            errors.add("new_password", "The new password confirmation does not match.");
        }
    }

    let updated = db
        .run(move |conn| {
            if !errors.contains("email") && users::email_taken(conn, &email, Some(user_id))? {
                errors.add("email", "The email has already been taken.");
            }
            errors.into_result()?;

            let new_hash = match (new_password, current_password) {
                (Some(new_password), Some(current_password)) => {
                    let stored = users::password_hash(conn, user_id)?.ok_or(ApiError::NotFound("User"))?;
                    if !verify_password(&current_password, &stored) {
                        let mut errors = ValidationErrors::new();
                        errors.add("current_password", "The current password is incorrect.");
                        return Err(ApiError::Validation(errors));
                    }
                    Some(hash_password(&new_password)?)
                }
                _ => None,
            };

            users::update_profile(conn, user_id, &name, &email, new_hash.as_deref(), Utc::now())?;
            users::find_user(conn, user_id)?.ok_or(ApiError::NotFound("User"))
        })
        .await?;

    info!("User {} updated their profile", user_id);
    Ok(updated)
}
