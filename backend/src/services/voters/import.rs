use crate::auth::SuperAdmin;
use crate::error::{ApiError, ApiResult};
use crate::import::import_csv;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::response::ApiResponse;
use futures_util::StreamExt;
use log::info;

/// Upload cap for a single CSV file.
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

const FILE_FIELD: &str = "file";

/// Handles `POST /api/voters/import/csv` with a multipart body carrying the CSV in a
/// `file` field. Other fields are drained and ignored.
pub(crate) async fn process(
    state: web::Data<AppState>,
    admin: SuperAdmin,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let bytes = read_csv_upload(payload).await?.ok_or_else(|| {
        ApiError::bad_request("CSV file is required. Upload with field name 'file'.")
    })?;

    let size = bytes.len();
    let report = state
        .blocking(move |store| import_csv(store, &bytes))
        .await?;

    info!(
        "{} imported a {} byte CSV: {}",
        admin.0.email,
        size,
        report.summary()
    );
    Ok(HttpResponse::Ok().json(ApiResponse::ok(report.summary(), report)))
}

/// Collects the `file` field. Rejects wrong file types before reading the content and
/// stops as soon as the size cap is exceeded.
async fn read_csv_upload(mut payload: Multipart) -> ApiResult<Option<Vec<u8>>> {
    let mut file: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if field_name.as_deref() != Some(FILE_FIELD) || file.is_some() {
            while let Some(chunk) = field.next().await {
                chunk.map_err(multipart_error)?;
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        let is_csv_mime = field
            .content_type()
            .is_some_and(|mime| mime.essence_str() == "text/csv");
        if !is_csv_mime && !filename.ends_with(".csv") {
            return Err(ApiError::bad_request("Only CSV files are allowed"));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(multipart_error)?;
            if bytes.len() + chunk.len() > MAX_FILE_SIZE {
                return Err(ApiError::bad_request("File too large. Maximum size is 10MB"));
            }
            bytes.extend_from_slice(&chunk);
        }
        file = Some(bytes);
    }

    Ok(file)
}

fn multipart_error(err: actix_multipart::MultipartError) -> ApiError {
    ApiError::bad_request(format!("Invalid multipart payload: {err}"))
}
