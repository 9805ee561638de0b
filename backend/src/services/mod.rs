pub mod auth;
pub mod health;
pub mod voters;

use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use common::model::response::ApiResponse;

/// JSON request bodies are capped at 10 MB, like the multipart CSV upload.
const JSON_LIMIT: usize = 10 * 1024 * 1024;

/// Registers every API scope plus the extractor configuration they share.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| {
                ApiError::bad_request(format!("Invalid request body: {}", err)).into()
            }),
    )
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::bad_request(format!("Invalid query string: {}", err)).into()
    }))
    .service(health::configure_routes())
    .service(auth::configure_routes())
    .service(voters::configure_routes());
}

/// Fallback for any path no scope claimed.
pub async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::failure("Route not found"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::auth::token::{issue_token, Claims};
    use crate::config::AppConfig;
    use crate::db::sqlite::SqliteStore;
    use crate::db::UserStore;
    use crate::state::AppState;
    use common::model::user::Role;
    use std::time::Duration;

    pub(crate) const SECRET: &str = "handler-test-secret";

    pub(crate) struct TestContext {
        pub state: AppState,
        pub admin_token: String,
        pub user_token: String,
    }

    impl TestContext {
        pub(crate) fn new() -> Self {
            let config = AppConfig::from_lookup(|key| match key {
                "JWT_SECRET" => Some(SECRET.to_string()),
                _ => None,
            })
            .unwrap();
            let store = SqliteStore::open_in_memory().unwrap();
            let admin = store
                .create_user("admin@example.com", "unused-hash", Role::SuperAdmin)
                .unwrap();
            let user = store
                .create_user("user@example.com", "unused-hash", Role::EndUser)
                .unwrap();

            let token_for = |id: &str, email: &str, role: Role| {
                issue_token(
                    &Claims::new(id, email, role, Duration::from_secs(3600)),
                    SECRET,
                )
                .unwrap()
            };

            Self {
                admin_token: token_for(&admin.id, &admin.email, admin.role),
                user_token: token_for(&user.id, &user.email, user.role),
                state: AppState::new(store, config),
            }
        }

        pub(crate) fn bearer(token: &str) -> (&'static str, String) {
            ("Authorization", format!("Bearer {token}"))
        }
    }

    /// Builds the full application around a test context's state.
    macro_rules! test_app {
        ($ctx:expr) => {
            actix_web::test::init_service(
                actix_web::App::new()
                    .app_data(actix_web::web::Data::new($ctx.state.clone()))
                    .configure(crate::services::configure)
                    .default_service(actix_web::web::route().to(crate::services::route_not_found)),
            )
            .await
        };
    }
    pub(crate) use test_app;
}
