use crate::error::Result as WebResult;
use crate::params::user::LoginParams;
use crate::response::user::LoginResponse;
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use domain::user as UserApi;
use log::*;

/// Logs the user in and returns a bearer token.
///
/// Pass the token back to the server for every protected API call, e.g.:
/// curl --header "Authorization: Bearer eyJhbGciOi..." http://localhost:8080/api/appointments
///
/// The event stream takes the same token as a query parameter:
/// curl -N "http://localhost:8080/api/events?token=eyJhbGciOi..."
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = crate::params::user::LoginParams,
    responses(
        (status = 200, description = "Logs in and returns a bearer token", body = crate::response::user::LoginResponse),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> WebResult<impl IntoResponse> {
    let (jwt, user) = UserApi::login(
        app_state.db_conn_ref(),
        &app_state.config,
        &params.email,
        &params.password,
    )
    .await
    .inspect_err(|_| warn!("Authentication failed for {:?}", params.email))?;

    Ok(Json(LoginResponse::new(jwt.token, user)))
}
