// --- File: crates/services/airline_backend/src/main.rs ---
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use airline_backend::{build_router, Dependencies};
use airline_common::{logging, HttpNotifier};
use airline_config::load_config;
use airline_db::{init_schema, DbClient};
use airline_payment::SimulatedGateway;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    info!("Enabled services: {}", config.enabled_services().join(", "));

    let db = DbClient::new(&config).await?;
    init_schema(&db).await?;
    info!("Database schema ready ({})", db);

    let deps = Dependencies {
        notifier: Arc::new(HttpNotifier::from_config(&config)),
        gateway: Arc::new(SimulatedGateway),
    };
    let app = build_router(config.clone(), db, deps);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
