use actix_web::web::{get, resource};
use actix_web::{HttpResponse, Resource};
use chrono::{SecondsFormat, Utc};

pub fn configure_routes() -> Resource {
    resource("/api/health").route(get().to(process))
}

/// Liveness probe; needs no authentication and never touches the store.
async fn process() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Voter Management API is running",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
