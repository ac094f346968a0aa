//! services/portal/src/bin/portal.rs

use axum::{extract::Request, ServiceExt};
use classroom_core::ports::KeyValueStorage;
use classroom_core::SeedData;
use portal_lib::{
    adapters::{FileStorage, MemoryStorage},
    config::Config,
    error::PortalError,
    web::{portal_service, state::AppState},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), PortalError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting portal...");

    // --- 2. Pick the Session Storage ---
    let storage: Arc<dyn KeyValueStorage> = match &config.session_file {
        Some(path) => {
            info!(path = %path.display(), "Persisting the session to disk");
            Arc::new(FileStorage::new(path.clone()))
        }
        None => {
            info!("SESSION_FILE not set; the session lasts as long as the process");
            Arc::new(MemoryStorage::new())
        }
    };

    // --- 3. Build the Shared AppState ---
    let seed = SeedData::classroom()?;
    let app_state = Arc::new(AppState::new(&config, storage, seed));

    // --- 4. Restore the Persisted Session ---
    // Guarded requests wait for this to finish.
    let session = app_state.session.clone();
    tokio::spawn(async move {
        let restored = session.restore().await;
        info!(
            authenticated = restored.is_authenticated(),
            "Session restore finished"
        );
    });

    // --- 5. Create the Web Router ---
    let app = portal_service(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
