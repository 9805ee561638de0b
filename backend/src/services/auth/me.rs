use crate::auth::AuthenticatedUser;
use crate::db::UserStore;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::response::ApiResponse;
use common::model::user::UserProfile;

pub(crate) async fn process(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let user = state
        .blocking(move |store| Ok(store.find_user_by_id(&caller.id)?))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Profile retrieved successfully",
        UserProfile {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        },
    )))
}
