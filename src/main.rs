use axum::serve;
use oat_links::build_app;
use oat_links::config::AppConfig;
use oat_links::store::{MemoryStore, PostgresStore};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    log::info!("OAT-LINKS: Property Reference Server");

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    let app = match config.database_url() {
        Some(database_url) => {
            log::info!("Connecting to PostgreSQL...");
            let max_connections = config.database.max_connections.unwrap_or(20);
            let store = PostgresStore::new(&database_url, max_connections).await?;
            store.migrate().await?;
            log::info!("Database ready");
            build_app(store, &config).await?
        }
        None => {
            log::info!("No database configured, using in-memory store");
            build_app(MemoryStore::new(), &config).await?
        }
    };

    run_server(app, &config).await
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("OAT-LINKS server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
