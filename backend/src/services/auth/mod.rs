//! # Auth Service Module
//!
//! Routes under `/api/auth`:
//!
//! *   **`POST /login`**: checks an email/password pair against the user store and
//!     returns a signed bearer token together with the user's id, email and role.
//! *   **`GET /me`**: returns the profile of the caller identified by the bearer token.

mod login;
mod me;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/login", post().to(login::process))
        .route("/me", get().to(me::process))
}
