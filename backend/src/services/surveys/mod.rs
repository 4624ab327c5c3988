//! # Survey Service Module
//!
//! Authoring endpoints for surveys and their questions, plus the public
//! lookup used by the shareable link. Submission and results endpoints live
//! in `services::results` and are nested under the same scope, because
//! Actix stops at the first scope whose prefix matches.
//!
//! ## Sub-modules:
//! - `list`, `create`, `show`, `update`, `delete`: owner-only CRUD.
//! - `get_by_slug`: public read of an open survey.
//! - `validate`: request validation shared by create and update.
//! - `slug`: derivation of unique public slugs from titles.

mod create;
mod delete;
mod get_by_slug;
mod list;
mod show;
mod slug;
mod update;
mod validate;

use crate::db::surveys;
use crate::error::ApiError;
use crate::services::results;
use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;
use common::model::survey::Survey;
use rusqlite::Connection;

/// The base path for all survey-related API endpoints.
const API_PATH: &str = "/api/survey";

/// Configures and returns the Actix `Scope` for all survey-related routes.
///
/// # Registered Routes:
///
/// *   **`GET /`** and **`POST /`**: list the caller's surveys, create a survey.
/// *   **`GET /get-by-slug/{slug}`**: public view of an active, unexpired survey.
/// *   **`GET|PUT|DELETE /{survey_id}`**: owner-only read, update and delete.
/// *   **`/{survey_id}/answer`** and **`/{survey_id}/results`**: see `services::results`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("", post().to(create::process))
        .route("/get-by-slug/{slug}", get().to(get_by_slug::process))
        .route("/{survey_id}", get().to(show::process))
        .route("/{survey_id}", put().to(update::process))
        .route("/{survey_id}", delete().to(delete::process))
        .service(results::configure_routes())
}

/// Loads a survey with its questions, failing with 404 when it does not exist
/// and 403 when `user_id` does not own it.
pub(crate) fn owned_survey(conn: &Connection, survey_id: i64, user_id: i64) -> Result<Survey, ApiError> {
    let survey = surveys::find_survey(conn, survey_id)?.ok_or(ApiError::NotFound("Survey"))?;
    if !survey.is_owned_by(user_id) {
        return Err(ApiError::Forbidden);
    }
    Ok(survey)
}
