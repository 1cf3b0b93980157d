use crate::error::Result as WebResult;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::user::RegisterParams;
use crate::response::user::{MeResponse, RegisteredUser};
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use domain::user as UserApi;
use log::*;

/// POST create a new customer account
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = crate::params::user::RegisterParams,
    responses(
        (status = 200, description = "Successfully registered a new user", body = crate::response::user::RegisteredUser),
        (status = 400, description = "Name, email or password missing"),
        (status = 409, description = "Email already registered"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(params): Json<RegisterParams>,
) -> WebResult<impl IntoResponse> {
    debug!("POST register new user {:?}", params.email);

    let user = UserApi::register(app_state.db_conn_ref(), params.into()).await?;

    Ok(Json(RegisteredUser::from(user)))
}

/// GET the profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Profile of the caller", body = crate::response::user::MeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(
    State(app_state): State<AppState>,
    AuthenticatedUser { id, is_admin }: AuthenticatedUser,
) -> WebResult<impl IntoResponse> {
    let user = UserApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(MeResponse {
        id: user.id.to_string(),
        admin: is_admin,
        name: user.name,
        email: user.email,
        phone: user.phone,
    }))
}
