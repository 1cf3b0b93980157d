use domain::events::EventPublisher;
use log::*;
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};
use sse::SseDomainEventHandler;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting garage backend in {} mode...",
        config.runtime_env()
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(db.as_ref(), None).await {
        error!("Failed to apply database migrations: {e}");
        std::process::exit(1);
    }

    domain::user::sync_admin_accounts(db.as_ref(), &config).await;

    // The hub lives as long as the server; handlers reach it through AppState.
    let sse_manager = Arc::new(sse::Manager::with_settings(
        config.sse_channel_capacity(),
        config.sse_heartbeat_interval(),
    ));
    let event_publisher = EventPublisher::new().with_handler(Arc::new(
        SseDomainEventHandler::new(Arc::clone(&sse_manager)),
    ));

    let app_state = web::AppState::new(
        service::AppState::new(config, &db),
        Arc::new(event_publisher),
        sse_manager,
    );

    if let Err(e) = web::init_server(app_state).await {
        error!("Server terminated with an error: {e}");
        std::process::exit(1);
    }

    info!("Server stopped");
}
