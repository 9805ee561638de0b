use crate::auth::SuperAdmin;
use crate::db::VoterStore;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::validate_new_voter;
use actix_web::{web, HttpResponse};
use common::model::response::ApiResponse;
use common::requests::CreateVoterRequest;
use log::info;

/// The body is extracted as a `Result` so a caller without the role gets 401/403
/// rather than a body error.
pub(crate) async fn process(
    state: web::Data<AppState>,
    admin: SuperAdmin,
    payload: Result<web::Json<CreateVoterRequest>, actix_web::Error>,
) -> actix_web::Result<HttpResponse> {
    let payload = payload?;
    let voter = validate_new_voter(&payload).map_err(|errors| {
        ApiError::bad_request(format!("Validation failed: {}", errors.join(", ")))
    })?;

    let created = state
        .blocking(move |store| Ok(store.create_voter(&voter)?))
        .await?;

    info!("{} created voter {}", admin.0.email, created.id);
    Ok(HttpResponse::Created().json(ApiResponse::ok("Voter created successfully", created)))
}
