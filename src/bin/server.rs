//! Amata content server
//!
//! Serves diets, training programs and workouts over HTTP, backed by a
//! SQLite document store.
//!
//! # Configuration
//!
//! Environment variables (override the config file):
//! - `AMATA_PORT`: Port to listen on (default: 3000)
//! - `AMATA_DATABASE_PATH`: SQLite database (default: ~/.local/share/amata/amata.db)
//! - `AMATA_ENV`: Environment recorded on created documents (default: dev)
//! - `AMATA_CREATED_BY`: Creator recorded on created documents (default: system)
//! - `AMATA_CONFIG`: Path to config file (default: ~/.config/amata/config.yaml)
//!
//! # Endpoints
//!
//! - `GET /health`
//! - `POST /diets`, `GET /diets`, `GET /diets/{diet_id}`, `PUT|PATCH /diets/{id}`
//! - `GET /organization/{org_id}/diets`
//! - `GET /programs`, `GET /programs/{id}`
//! - `GET /workouts`, `GET /workouts/{uid}`, `PATCH /workouts/{uid}/stats`

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use amata::api::{router, AppState};
use amata::config::Config;
use amata::db::init_db;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amata=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("AMATA_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path)?;

    if let Some(path) = &config.config_file {
        tracing::info!("Config file: {}", path.display());
    }
    tracing::info!(
        "Database: {} ({})",
        config.database_path.value.display(),
        config.database_path.source
    );

    let pool = init_db(&config.database_path.value).await?;
    let app = router(AppState::new(pool, config.audit()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port.value));
    tracing::info!("Starting server on {} (env: {})", addr, config.env.value);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
