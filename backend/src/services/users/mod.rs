//! # User Profile Service Module
//!
//! Profile endpoints of the authenticated user, under `/api/user`.
//!
//! ## Sub-modules:
//! - `me`: the caller's profile.
//! - `update`: name, email and optional password change.
//! - `avatar`: multipart avatar upload replacing the previous one.

mod avatar;
mod me;
mod update;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/user";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(me::process))
        .route("", put().to(update::process))
        .route("/avatar", post().to(avatar::process))
}
