use crate::auth::SuperAdmin;
use crate::db::VoterStore;
use crate::error::ApiResult;
use crate::export::voters_to_csv;
use crate::state::AppState;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::info;

pub(crate) async fn process(
    state: web::Data<AppState>,
    admin: SuperAdmin,
) -> ApiResult<HttpResponse> {
    let csv = state
        .blocking(|store| {
            let voters = store.list_voters()?;
            voters_to_csv(&voters).map(|csv| (csv, voters.len()))
        })
        .await;
    let (csv, count) = csv?;

    info!("{} exported {} voters", admin.0.email, count);
    let filename = format!("voters_export_{}.csv", Utc::now().timestamp_millis());
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        ))
        .body(csv))
}
