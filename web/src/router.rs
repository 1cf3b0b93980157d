use crate::{
    controller::health_check_controller, middleware::auth::require_auth, params, protect,
    response, sse, AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::controller::{
    admin, appointment_controller, user_controller, user_session_controller,
};

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Garage Appointments API"
        ),
        paths(
            health_check_controller::health_check,
            user_controller::register,
            user_controller::me,
            user_session_controller::login,
            appointment_controller::index,
            appointment_controller::create,
            appointment_controller::update,
            appointment_controller::delete,
            admin::appointment_controller::index,
            admin::appointment_controller::update_status,
            sse::handler::sse_handler,
        ),
        components(
            schemas(
                params::user::RegisterParams,
                params::user::LoginParams,
                params::appointment::CreateParams,
                params::appointment::UpdateParams,
                params::appointment::UpdateStatusParams,
                response::appointment::AppointmentResponse,
                response::user::RegisteredUser,
                response::user::LoginResponse,
                response::user::LoginUser,
                response::user::MeResponse,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "garage", description = "Garage appointment booking API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our bearer token authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned from a successful POST /api/login"))
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    let static_dir = app_state.config.static_dir.clone();

    Router::new()
        .merge(health_routes())
        .merge(user_session_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(appointment_routes(app_state.clone()))
        .merge(admin_appointment_routes(app_state.clone()))
        .merge(sse_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes(&static_dir))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn user_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/register", post(user_controller::register))
        .route("/api/login", post(user_session_controller::login))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/me", get(user_controller::me))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn appointment_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/appointments",
            get(appointment_controller::index).post(appointment_controller::create),
        )
        .merge(
            // PUT/PATCH/DELETE /api/appointments/{id}
            Router::new()
                .route(
                    "/api/appointments/{id}",
                    axum::routing::put(appointment_controller::update)
                        .patch(appointment_controller::update)
                        .delete(appointment_controller::delete),
                )
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::appointments::owner,
                )),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn admin_appointment_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/admin/appointments",
            get(admin::appointment_controller::index),
        )
        .route(
            "/api/admin/appointments/{id}/status",
            patch(admin::appointment_controller::update_status),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::admin::require_admin,
        ))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/events", get(sse::handler::sse_handler))
        .with_state(app_state)
}

// Serves the single page frontend. Unknown paths get index.html so client-side routing works.
fn static_routes(static_dir: &str) -> ServeDir<ServeFile> {
    let index = std::path::Path::new(static_dir).join("index.html");
    ServeDir::new(static_dir).fallback(ServeFile::new(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{app_state, token_for};
    use axum::body::Body;
    use axum::http::{header::AUTHORIZATION, Request, StatusCode};
    use domain::Id;
    use tower::ServiceExt;

    fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from("{}")).unwrap()
    }

    #[tokio::test]
    async fn health_check_is_public() {
        let response = define_routes(app_state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        for (method, uri) in [
            ("GET", "/api/me"),
            ("GET", "/api/appointments"),
            ("POST", "/api/appointments"),
            ("DELETE", "/api/appointments/8d6c3c6e-6c42-4c3e-9d4b-1f0f5d1f2a11"),
            ("GET", "/api/admin/appointments"),
        ] {
            let response = define_routes(app_state())
                .oneshot(request(method, uri, None))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn admin_routes_forbid_customers() {
        let token = token_for(Id::new_v4(), false);

        let response = define_routes(app_state())
            .oneshot(request("GET", "/api/admin/appointments", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = define_routes(app_state())
            .oneshot(request(
                "PATCH",
                &format!("/api/admin/appointments/{}/status", Id::new_v4()),
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn register_without_required_fields_is_a_bad_request() {
        let response = define_routes(app_state())
            .oneshot(request("POST", "/api/register", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn creating_with_a_malformed_datetime_is_a_bad_request() {
        let token = token_for(Id::new_v4(), false);
        let request = Request::builder()
            .method("POST")
            .uri("/api/appointments")
            .header("content-type", "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(r#"{"datetime":"tomorrow"}"#))
            .unwrap();

        let response = define_routes(app_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_with_bad_status_is_a_bad_request() {
        let token = token_for(Id::new_v4(), true);
        let request = Request::builder()
            .method("PATCH")
            .uri(format!("/api/admin/appointments/{}/status", Id::new_v4()))
            .header("content-type", "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(r#"{"status":"maybe"}"#))
            .unwrap();

        let response = define_routes(app_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
