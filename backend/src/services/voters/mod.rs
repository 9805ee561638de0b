//! # Voters Service Module
//!
//! HTTP API for the voter registry, mounted under `/api/voters`. Every route needs a
//! bearer token; routes that change data or move whole files need the `SUPER_ADMIN`
//! role, enforced by the [`SuperAdmin`](crate::auth::SuperAdmin) extractor.
//!
//! *   **`GET /`**: paginated, case-insensitive name search (`search`, `page`, `limit`).
//! *   **`POST /`**: creates one voter after field validation. Replies `201`.
//! *   **`GET /export/csv`**: downloads every voter as a CSV attachment, newest first.
//! *   **`POST /import/csv`**: multipart upload of a CSV file (field `file`), run through
//!     the import pipeline. Replies with the per-row import report.
//! *   **`GET /{id}`**, **`PUT /{id}`**, **`DELETE /{id}`**: fetch, partially update and
//!     delete a single voter.
//!
//! The file routes are registered ahead of `/{id}`.

mod create;
mod delete;
mod export;
mod get;
mod import;
mod search;
mod update;

use actix_web::web::{delete, get, post, put, resource, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/voters";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/export/csv", get().to(export::process))
        .route("/import/csv", post().to(import::process))
        .service(
            resource("")
                .route(get().to(search::process))
                .route(post().to(create::process)),
        )
        .service(
            resource("/{id}")
                .route(get().to(get::process))
                .route(put().to(update::process))
                .route(delete().to(delete::process)),
        )
}
