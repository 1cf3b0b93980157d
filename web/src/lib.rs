use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use domain::events::EventPublisher;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
mod protect;
mod response;
mod router;
mod sse;

pub use error::{Error, Result};
pub use router::define_routes;

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Arc<DatabaseConnection>,
    pub config: Config,
    pub event_publisher: Arc<EventPublisher>,
    pub sse_manager: Arc<::sse::Manager>,
}

impl AppState {
    pub fn new(
        service_state: service::AppState,
        event_publisher: Arc<EventPublisher>,
        sse_manager: Arc<::sse::Manager>,
    ) -> Self {
        Self {
            database_connection: service_state.database_connection,
            config: service_state.config,
            event_publisher,
            sse_manager,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.database_connection.as_ref()
    }
}

/// Binds the configured interface and port and serves until Ctrl-C or SIGTERM.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{host}:{}", app_state.config.port);
    let listener = TcpListener::bind(&server_url).await?;

    info!("Server starting... listening for connections on http://{server_url}");

    let cors = cors_layer(&app_state.config);
    let sse_manager = Arc::clone(&app_state.sse_manager);
    let router = router::define_routes(app_state).layer(cors);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(sse_manager))
        .await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

// Closing the hub first ends every open event stream, otherwise the graceful
// shutdown would wait on them forever.
async fn shutdown_signal(sse_manager: Arc<::sse::Manager>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, closing event streams");
    sse_manager.shutdown();
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use clap::Parser;
    use domain::Id;

    pub(crate) const TEST_SECRET: &str = "test-secret";

    pub(crate) fn test_config() -> Config {
        Config::parse_from(["garage_backend", "--jwt-secret", TEST_SECRET])
    }

    pub(crate) fn app_state_with_db(db: DatabaseConnection) -> AppState {
        let sse_manager = Arc::new(::sse::Manager::new());
        let event_publisher = EventPublisher::new().with_handler(Arc::new(
            ::sse::SseDomainEventHandler::new(Arc::clone(&sse_manager)),
        ));
        AppState::new(
            service::AppState::new(test_config(), &Arc::new(db)),
            Arc::new(event_publisher),
            sse_manager,
        )
    }

    pub(crate) fn app_state() -> AppState {
        app_state_with_db(DatabaseConnection::Disconnected)
    }

    pub(crate) fn token_for(user_id: Id, is_admin: bool) -> String {
        domain::jwt::generate_token(&test_config(), user_id, is_admin)
            .unwrap()
            .token
    }
}
