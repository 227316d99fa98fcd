use std::sync::Arc;

use streamstats::{
    build_router, AppState, InMemoryStatsRepository, PostgresStatsRepository, ServerConfig,
    StatsRepository, TokenConfig,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamstats=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting livestream statistics server");

    let config = ServerConfig::from_env()?;

    let stats_repository: Arc<dyn StatsRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            info!("Connected to PostgreSQL");
            Arc::new(PostgresStatsRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, serving statistics from an empty in-memory repository");
            Arc::new(InMemoryStatsRepository::new())
        }
    };

    let app_state = AppState::new(stats_repository, TokenConfig::new());
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
