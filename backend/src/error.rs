//! Error type shared by every handler.
//!
//! `ApiError` implements `ResponseError`, so handlers return
//! `Result<HttpResponse, ApiError>` and propagate failures with `?`. Client
//! errors are rendered as `{"message": ...}` (plus `errors` for validation
//! failures); internal errors are logged and rendered with a generic message.

use actix_web::error::{BlockingError, InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use log::{error, warn};
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Longest accepted name or email, matching the column rules.
pub const MAX_FIELD_CHARS: usize = 255;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("The provided credentials are not correct")]
    InvalidCredentials,

    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error("Unauthorized")]
    Forbidden,

    #[error("Survey is not active")]
    SurveyInactive,

    #[error("Survey has expired")]
    SurveyExpired,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),

    #[error("Blocking task failed: {0}")]
    Blocking(#[from] BlockingError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidCredentials => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden | ApiError::SurveyInactive | ApiError::SurveyExpired => {
                StatusCode::FORBIDDEN
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_)
            | ApiError::Storage(_)
            | ApiError::Serialization(_)
            | ApiError::PasswordHash(_)
            | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(errors) => json!({
                "message": self.to_string(),
                "errors": errors,
            }),
            _ if status.is_server_error() => {
                error!("{}", self);
                json!({ "message": "Server Error" })
            }
            _ => json!({ "message": self.to_string() }),
        };
        HttpResponse::build(status).json(body)
    }
}

/// Validation messages keyed by field name, e.g. `answers.0.question_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when nothing was recorded, otherwise a 422 error carrying every message.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Accepts `local@domain.tld` shaped addresses.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Renders JSON body rejections in the same shape as handler errors: bodies
/// that do not deserialize become a 422 on the `body` field.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected request body: {}", err);
    let response = match &err {
        JsonPayloadError::Deserialize(cause) => {
            let mut errors = ValidationErrors::new();
            errors.add("body", cause.to_string());
            ApiError::Validation(errors).error_response()
        }
        _ => HttpResponse::build(err.status_code()).json(json!({ "message": err.to_string() })),
    };
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn validation_errors_render_as_422_with_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "The title field is required.");
        let err = errors.into_result().unwrap_err();

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Validation failed");
        assert_eq!(json["errors"]["title"][0], "The title field is required.");
    }

    #[actix_web::test]
    async fn internal_errors_hide_details() {
        let err = ApiError::Database(rusqlite::Error::InvalidQuery);
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], br#"{"message":"Server Error"}"#);
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ana@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("not an email"));
    }

    #[actix_web::test]
    async fn undecodable_bodies_render_as_json_422() {
        let cause = serde_json::from_str::<u32>("\"five\"").unwrap_err();
        let req = actix_web::test::TestRequest::default().to_http_request();
        let err = json_error_handler(JsonPayloadError::Deserialize(cause), &req);

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Validation failed");
        assert!(json["errors"]["body"][0].is_string());
    }
}
