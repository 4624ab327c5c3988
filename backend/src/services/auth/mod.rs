//! # Account & Session Service Module
//!
//! Registration, login and logout. Successful signup and login return a
//! bearer token that authenticates every owner-only endpoint.
//!
//! ## Sub-modules:
//! - `signup`: creates an account and opens its first session.
//! - `login`: checks credentials and opens a new session.
//! - `logout`: closes the session of the presented token.
//! - `me`: returns the account behind the presented token.

mod login;
mod logout;
mod me;
mod signup;

use actix_web::web::{get, post, scope};
use actix_web::Scope;
use common::model::user::User;
use serde::Serialize;

/// The base path for account endpoints. Registered after every other `/api`
/// scope so it does not shadow them.
const API_PATH: &str = "/api";

/// Body returned by signup and login.
#[derive(Serialize)]
struct SessionBody {
    user: User,
    token: String,
}

/// Configures and returns the Actix `Scope` for account routes.
///
/// # Registered Routes:
///
/// *   **`POST /signup`**: `{name, email, password, password_confirmation}` → `201 {user, token}`.
/// *   **`POST /login`**: `{email, password}` → `{user, token}`.
/// *   **`POST /logout`**: revokes the bearer token.
/// *   **`GET /me`**: the authenticated user.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/signup", post().to(signup::process))
        .route("/login", post().to(login::process))
        .route("/logout", post().to(logout::process))
        .route("/me", get().to(me::process))
}
