use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use cycle_tracker::config::Config;
use cycle_tracker::store::{MemoryCycleStore, PgCycleStore, SharedStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: SharedStore = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;
            let store = PgCycleStore::new(pool);
            store.migrate().await?;
            tracing::info!("🗄️ Using PostgreSQL cycle store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("⚠️ DATABASE_URL not set, cycles are kept in memory");
            Arc::new(MemoryCycleStore::new())
        }
    };

    let app = cycle_tracker::app(store);

    tracing::info!("🧠 Server running at {}", config.bind_addr);

    axum::serve(
        tokio::net::TcpListener::bind(config.bind_addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
