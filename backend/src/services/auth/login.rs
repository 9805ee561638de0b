use crate::auth::password::{verify_dummy_password, verify_password};
use crate::auth::token::{issue_token, Claims};
use crate::db::UserStore;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::validate_login;
use actix_web::{web, HttpResponse};
use common::model::response::ApiResponse;
use common::model::user::{LoginResponse, UserSummary};
use common::requests::LoginRequest;
use log::{info, warn};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub(crate) async fn process(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = validate_login(&payload)
        .map_err(|errors| ApiError::bad_request(format!("Validation failed: {}", errors.join(", "))))?;

    let email = credentials.email.clone();
    let user = state
        .blocking(move |store| {
            Ok(match store.find_user_by_email(&credentials.email)? {
                Some(user) if verify_password(&credentials.password, &user.password_hash) => {
                    Some(user)
                }
                Some(_) => None,
                None => {
                    verify_dummy_password(&credentials.password);
                    None
                }
            })
        })
        .await?;

    let Some(user) = user else {
        warn!("Failed login attempt for {}", email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let claims = Claims::new(&user.id, &user.email, user.role, state.config.jwt_expires_in);
    let token = issue_token(&claims, &state.config.jwt_secret)
        .map_err(|e| ApiError::internal(format!("token signing failed: {e}")))?;

    info!("User {} logged in", user.email);
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            token,
            user: UserSummary {
                id: user.id,
                email: user.email,
                role: user.role,
            },
        },
    )))
}
