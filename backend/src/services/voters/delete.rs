use crate::auth::SuperAdmin;
use crate::db::VoterStore;
use crate::error::ApiResult;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::response::ApiResponse;
use log::info;

pub(crate) async fn process(
    state: web::Data<AppState>,
    admin: SuperAdmin,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = id.into_inner();
    let deleted = id.clone();
    state
        .blocking(move |store| Ok(store.delete_voter(&id)?))
        .await?;

    info!("{} deleted voter {}", admin.0.email, deleted);
    Ok(HttpResponse::Ok().json(ApiResponse::message("Voter deleted successfully")))
}
