mod api;
mod config;
mod db;
mod error;
mod query;
mod seed;
mod types;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::db::TransactionStore;
use crate::error::Result;
use crate::query::QueryService;
use crate::seed::SeedLoader;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = db::open(&cfg.db_path).await?;
    let store = TransactionStore::new(pool);
    info!(
        "Database ready at {} ({} transactions)",
        cfg.db_path,
        store.count().await?
    );

    // --- Seed loader ---
    let seeder = SeedLoader::new(store.clone(), cfg.seed_url.clone())?;
    if cfg.seed_on_startup {
        match seeder.load().await {
            Ok(n) => info!("Seeded {n} transactions from {}", cfg.seed_url),
            Err(e) => warn!("Startup seed failed, serving existing data: {e}"),
        }
    }

    // --- HTTP API server ---
    let api_state = ApiState {
        queries: QueryService::new(store),
        seeder,
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
