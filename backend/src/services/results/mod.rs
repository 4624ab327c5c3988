//! # Survey Results Service Module
//!
//! Collects responses from respondents and serves the aggregated view to the
//! survey owner. Nested inside the survey scope (see `services::surveys`),
//! so the paths below are relative to `/api/survey`.
//!
//! ## Sub-modules:
//! - `submit`: public submission of a response to an open survey.
//! - `index`: owner-only results, aggregated by `common::results`.

mod index;
mod submit;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// Configures and returns the nested `/{survey_id}` scope.
///
/// # Registered Routes:
///
/// *   **`POST /{survey_id}/answer`**:
///     - **Handler**: `submit::process`
///     - **Description**: Stores `{answers: [{question_id, answer}], participant_email?}`
///       with a server-assigned submission time. Rejected with `403` when the survey
///       is a draft or past its expiry date.
///
/// *   **`GET /{survey_id}/results`**:
///     - **Handler**: `index::process`
///     - **Description**: Returns `{survey, results, total_responses, completion_rate}`
///       where `results` groups every answer by question id, newest first.
pub fn configure_routes() -> Scope {
    scope("/{survey_id}")
        .route("/answer", post().to(submit::process))
        .route("/results", get().to(index::process))
}
