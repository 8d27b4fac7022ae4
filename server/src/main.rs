//! Mover Server binary.

use mover_engine::{Store, StoreSnapshot};
use mover_server::{app, backend::Backend, config::Config, db, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mover_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Mover Server on {}:{}", config.host, config.port);

    let backend = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url, config.max_connections).await?;

            tracing::info!("Running database migrations...");
            db::run_migrations(&pool).await?;

            Backend::postgres(pool)
        }
        None => {
            let store = match &config.seed_file {
                Some(path) => {
                    let json = std::fs::read_to_string(path)?;
                    let snapshot = StoreSnapshot::from_json(&json)?;
                    tracing::info!(
                        rows = snapshot.row_count(),
                        "Seeding in-memory store from {}",
                        path.display()
                    );
                    Store::from_snapshot(snapshot)?
                }
                None => Store::new(),
            };
            tracing::warn!("DATABASE_URL not set, using the in-memory record store");
            Backend::memory(store)
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    let app = app(AppState::new(backend, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
