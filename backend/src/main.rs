//! ChemTrack inventory server

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chemtrack_backend::{
    config::{Config, LogFormat},
    create_app,
    services::AlertService,
    store::{InventoryStore, PgStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(config.logging.format);

    tracing::info!("Starting ChemTrack Inventory Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.is_development() {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let store: Arc<dyn InventoryStore> = Arc::new(PgStore::new(db_pool));

    if config.alerts.sync_on_startup {
        match AlertService::new(store.clone()).sync_all(Utc::now()).await {
            Ok(report) => tracing::info!(
                created = report.new_alerts_count,
                unread = report.severity_counts.total,
                "Startup alert sync finished"
            ),
            Err(e) => tracing::warn!(error = %e, "Startup alert sync failed"),
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Build application
    let app = create_app(AppState::new(store, config));

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "chemtrack_server=debug,chemtrack_backend=debug,tower_http=debug,sqlx=warn".into()
    });

    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}
