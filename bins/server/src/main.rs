//! SiteTrack API Server
//!
//! Main entry point for the SiteTrack backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitetrack_api::{AppState, create_router};
use sitetrack_core::storage::{StorageConfig, StorageService};
use sitetrack_db::{RoleRepository, connect};
use sitetrack_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitetrack=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    let seeded = RoleRepository::new(db.clone()).ensure_seeded().await?;
    if seeded > 0 {
        info!(count = seeded, "Seeded missing roles");
    }

    let jwt_config = JwtConfig::from(&config.jwt);
    if jwt_config.secret.is_empty() {
        tracing::warn!("jwt.secret is empty; token issuance will fail");
    }
    let jwt_service = JwtService::new(jwt_config);

    let storage = StorageService::from_config(StorageConfig::new(&config.storage.upload_dir))?;
    info!(
        upload_dir = %config.storage.upload_dir,
        max_request_bytes = config.storage.max_request_bytes,
        "Blob storage configured"
    );

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage: Arc::new(storage),
        max_request_bytes: config.storage.max_request_bytes,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
