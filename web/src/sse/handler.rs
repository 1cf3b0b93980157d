use crate::params::sse::StreamParams;
use crate::AppState;
use ::sse::Frame;
use axum::extract::{Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use log::*;
use std::convert::Infallible;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// GET a long-lived event stream for the user the `token` query parameter was issued to.
///
/// The stream opens with a `: connected` comment, carries a `: ping` comment every
/// heartbeat interval and one `data:` line per event. It stays open until the client
/// disconnects or the server shuts down.
#[utoipa::path(
    get,
    path = "/api/events",
    params(StreamParams),
    responses(
        (status = 200, description = "text/event-stream of appointment notifications"),
        (status = 401, description = "Token missing or invalid")
    )
)]
pub(crate) async fn sse_handler(
    State(app_state): State<AppState>,
    Query(params): Query<StreamParams>,
) -> Response {
    let Some(token) = params.token.filter(|token| !token.is_empty()) else {
        debug!("Rejecting event stream without a token");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };

    let identity = match domain::jwt::verify_token(&app_state.config, &token) {
        Ok(identity) => identity,
        Err(e) => {
            debug!("Rejecting event stream token: {e}");
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    debug!("Establishing SSE connection for user {}", identity.subject);

    // Dropping the body (client gone or write failed) drops the session, which unregisters it.
    let session = app_state.sse_manager.open_session(identity.subject);
    let stream = session
        .into_stream()
        .map(|frame| Ok::<_, Infallible>(to_sse_event(frame)));

    (
        [(X_ACCEL_BUFFERING, HeaderValue::from_static("no"))],
        Sse::new(stream),
    )
        .into_response()
}

fn to_sse_event(frame: Frame) -> Event {
    match frame {
        Frame::Comment(text) => Event::default().comment(text),
        Frame::Data(payload) => Event::default().data(&*payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{app_state, token_for};
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request};
    use axum::routing::get;
    use axum::Router;
    use domain::Id;
    use ::sse::message::Event as SseEvent;
    use tower::ServiceExt;

    fn app(app_state: AppState) -> Router {
        Router::new()
            .route("/api/events", get(sse_handler))
            .with_state(app_state)
    }

    fn get_events(query: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/api/events{query}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn next_chunk(stream: &mut axum::body::BodyDataStream) -> Option<String> {
        stream
            .next()
            .await
            .map(|chunk| String::from_utf8(chunk.unwrap().to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let response = app(app_state()).oneshot(get_events("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(app_state())
            .oneshot(get_events("?token="))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized_and_registers_nothing() {
        let state = app_state();
        let manager = state.sse_manager.clone();

        let response = app(state)
            .oneshot(get_events("?token=garbage"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(manager.user_count(), 0);
    }

    #[tokio::test]
    async fn stream_delivers_connected_marker_then_the_users_events() {
        let state = app_state();
        let manager = state.sse_manager.clone();
        let user_id = Id::new_v4();

        let response = app(state)
            .oneshot(get_events(&format!("?token={}", token_for(user_id, false))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
        assert_eq!(response.headers().get(X_ACCEL_BUFFERING).unwrap(), "no");

        let mut body = response.into_body().into_data_stream();
        assert_eq!(next_chunk(&mut body).await.unwrap(), ": connected\n\n");
        assert_eq!(manager.subscriber_count(&user_id.to_string()), 1);

        manager.send_to_user(
            &Id::new_v4().to_string(),
            &SseEvent::appointment_status("other", "accepted"),
        );
        manager.send_to_user(
            &user_id.to_string(),
            &SseEvent::appointment_status("a1", "accepted"),
        );
        assert_eq!(
            next_chunk(&mut body).await.unwrap(),
            "data: {\"type\":\"appointment_status\",\"appointment_id\":\"a1\",\"status\":\"accepted\",\"message\":\"Your appointment status was updated\"}\n\n"
        );

        drop(body);
        assert_eq!(manager.subscriber_count(&user_id.to_string()), 0);
    }

    #[tokio::test]
    async fn hub_shutdown_ends_open_streams() {
        let state = app_state();
        let manager = state.sse_manager.clone();
        let user_id = Id::new_v4();

        let response = app(state)
            .oneshot(get_events(&format!("?token={}", token_for(user_id, false))))
            .await
            .unwrap();
        let mut body = response.into_body().into_data_stream();
        next_chunk(&mut body).await;

        manager.shutdown();

        assert_eq!(next_chunk(&mut body).await, None);
        assert_eq!(manager.user_count(), 0);
    }
}
