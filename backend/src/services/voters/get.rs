use crate::auth::AuthenticatedUser;
use crate::db::VoterStore;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::response::ApiResponse;

pub(crate) async fn process(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    let voter = state
        .blocking(move |store| Ok(store.get_voter(&id)?))
        .await?
        .ok_or_else(|| ApiError::not_found("Voter not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Voter retrieved successfully", voter)))
}
