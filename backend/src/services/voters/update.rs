use crate::auth::SuperAdmin;
use crate::db::VoterStore;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::validate_voter_patch;
use actix_web::{web, HttpResponse};
use common::model::response::ApiResponse;
use common::requests::UpdateVoterRequest;
use log::info;

pub(crate) async fn process(
    state: web::Data<AppState>,
    admin: SuperAdmin,
    id: web::Path<String>,
    payload: Result<web::Json<UpdateVoterRequest>, actix_web::Error>,
) -> actix_web::Result<HttpResponse> {
    let payload = payload?;
    let patch = validate_voter_patch(&payload).map_err(|errors| {
        ApiError::bad_request(format!("Validation failed: {}", errors.join(", ")))
    })?;

    let id = id.into_inner();
    let updated = state
        .blocking(move |store| Ok(store.update_voter(&id, &patch)?))
        .await?;

    info!("{} updated voter {}", admin.0.email, updated.id);
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Voter updated successfully", updated)))
}
