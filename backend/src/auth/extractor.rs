use super::token::verify_token;
use crate::db::UserStore;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use common::model::user::Role;
use futures_util::future::LocalBoxFuture;
use log::debug;

/// The caller of a protected endpoint, resolved from its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// An [`AuthenticatedUser`] whose role is `SUPER_ADMIN`.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub AuthenticatedUser);

fn bearer_token(value: Option<&str>) -> Option<&str> {
    let token = value?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| ApiError::internal("application state is not registered"))?;
            let token = bearer_token(authorization.as_deref())
                .ok_or_else(|| ApiError::unauthorized("Access token is required"))?;

            let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
                debug!("Rejected bearer token: {}", e);
                ApiError::unauthorized("Invalid or expired token")
            })?;

            let user = state
                .blocking(move |store| Ok(store.find_user_by_id(&claims.sub)?))
                .await?
                .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

            Ok(AuthenticatedUser {
                id: user.id,
                email: user.email,
                role: user.role,
            })
        })
    }
}

impl FromRequest for SuperAdmin {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let user = AuthenticatedUser::from_request(req, payload);
        Box::pin(async move {
            let user = user.await?;
            if user.role != Role::SuperAdmin {
                return Err(ApiError::forbidden(
                    "You do not have permission to perform this action",
                ));
            }
            Ok(SuperAdmin(user))
        })
    }
}
