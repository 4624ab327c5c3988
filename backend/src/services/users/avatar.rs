//! # Avatar Upload Service
//!
//! Backs `POST /api/user/avatar`. The request is `multipart/form-data` with a
//! single `avatar` file field (jpeg, png, gif or svg, at most 2048 KB).
//!
//! The upload is streamed into memory chunk by chunk and rejected as soon as
//! it exceeds the size limit. Raster images must decode as the type their
//! file name claims; SVG files must start with an XML or `<svg` tag. The file
//! is stored under `avatars/`, the user's `avatar_url` is updated, and the
//! previous avatar file is deleted once nothing references it.

use crate::auth::AuthenticatedUser;
use crate::db::{storage_url_in_use, users, Database};
use crate::error::{ApiError, ValidationErrors};
use crate::storage::{Storage, AVATARS};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::user::User;
use futures_util::StreamExt;
use image::ImageFormat;
use log::info;
use mime_guess::from_path;
use serde_json::json;

const MAX_AVATAR_BYTES: usize = 2048 * 1024;

pub(crate) async fn process(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    storage: web::Data<Storage>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let updated = upload_avatar(&db, &storage, user.id, payload).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Avatar updated successfully",
        "user": updated,
    })))
}

fn invalid(message: &str) -> ApiError {
    let mut errors = ValidationErrors::new();
    errors.add("avatar", message);
    ApiError::Validation(errors)
}

/// Maps a file name to the stored extension and, for raster types, the
/// format its bytes must have.
fn avatar_type(filename: &str) -> Option<(&'static str, Option<ImageFormat>)> {
    let mime = from_path(filename).first()?;
    match mime.essence_str() {
        "image/jpeg" => Some(("jpg", Some(ImageFormat::Jpeg))),
        "image/png" => Some(("png", Some(ImageFormat::Png))),
        "image/gif" => Some(("gif", Some(ImageFormat::Gif))),
        "image/svg+xml" => Some(("svg", None)),
        _ => None,
    }
}

fn content_matches(bytes: &[u8], format: Option<ImageFormat>) -> bool {
    match format {
        Some(format) => image::guess_format(bytes).is_ok_and(|actual| actual == format),
        None => {
            let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
            let head = head.trim_start();
            head.starts_with("<svg") || head.starts_with("<?xml")
        }
    }
}

async fn read_avatar(mut payload: Multipart) -> Result<(&'static str, Vec<u8>), ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| invalid(&format!("Malformed upload: {e}")))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("avatar") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        let (extension, format) = avatar_type(&filename)
            .ok_or_else(|| invalid("The avatar must be a file of type: jpeg, png, jpg, gif, svg."))?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| invalid(&format!("Malformed upload: {e}")))?;
            if bytes.len() + chunk.len() > MAX_AVATAR_BYTES {
                return Err(invalid("The avatar may not be greater than 2048 kilobytes."));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() || !content_matches(&bytes, format) {
            return Err(invalid("The avatar must be an image."));
        }
        return Ok((extension, bytes));
    }
    Err(invalid("The avatar field is required."))
}

async fn upload_avatar(
    db: &Database,
    storage: &Storage,
    user_id: i64,
    payload: Multipart,
) -> Result<User, ApiError> {
    let (extension, bytes) = read_avatar(payload).await?;
    let url = storage.store(AVATARS, extension, &bytes).await?;

    let (user, stale) = db
        .run(move |conn| {
            let previous = users::find_user(conn, user_id)?
                .ok_or(ApiError::NotFound("User"))?
                .avatar_url;
            users::set_avatar(conn, user_id, &url, Utc::now())?;
            let stale = match previous {
                Some(old) if !storage_url_in_use(conn, &old)? => Some(old),
                _ => None,
            };
            let user = users::find_user(conn, user_id)?.ok_or(ApiError::NotFound("User"))?;
            Ok((user, stale))
        })
        .await?;

    if let Some(old) = stale {
        storage.delete(&old).await?;
    }

    info!("User {} uploaded a new avatar", user_id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::PIXEL_GIF;

    #[test]
    fn avatar_types_follow_the_file_extension() {
        assert_eq!(avatar_type("me.JPEG"), Some(("jpg", Some(ImageFormat::Jpeg))));
        assert_eq!(avatar_type("logo.svg"), Some(("svg", None)));
        assert_eq!(avatar_type("notes.txt"), None);
        assert_eq!(avatar_type("no_extension"), None);
    }

    #[test]
    fn content_must_match_the_declared_type() {
        assert!(content_matches(PIXEL_GIF, Some(ImageFormat::Gif)));
        assert!(!content_matches(PIXEL_GIF, Some(ImageFormat::Png)));
        assert!(content_matches(b"  <svg xmlns=\"http://www.w3.org/2000/svg\"/>", None));
        assert!(!content_matches(b"GIF89a", None));
    }
}
