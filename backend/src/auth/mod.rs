//! Request-scoped identity.
//!
//! Clients authenticate with `Authorization: Bearer <token>`, where the token
//! was issued by signup or login and is stored in the `sessions` table.
//! Handlers that need an owner take an [`AuthenticatedUser`] argument; the
//! extractor rejects the request with `401` before the handler runs when the
//! token is missing or unknown.

pub mod password;

use crate::db::{users, Database};
use crate::error::ApiError;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use log::warn;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub token: String,
}

/// A fresh random session token.
pub fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let database = req.app_data::<web::Data<Database>>().cloned();

        Box::pin(async move {
            let token = token.ok_or(ApiError::Unauthenticated)?;
            let Some(database) = database else {
                warn!("Database is not registered as app data");
                return Err(ApiError::Unauthenticated);
            };

            let lookup = token.clone();
            let user_id = database
                .run(move |conn| Ok(users::session_user(conn, &lookup)?))
                .await?
                .ok_or(ApiError::Unauthenticated)?;

            Ok(AuthenticatedUser { id: user_id, token })
        })
    }
}
