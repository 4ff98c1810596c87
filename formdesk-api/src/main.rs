use anyhow::Result;
use formdesk_api::{create_app, Config};
use formdesk_workspace::db::{backup_database, create_memory_pool, create_pool, run_migrations};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = formdesk_logging::init_subscriber();

    info!("Starting formdesk-api service...");

    let config = Config::from_env();
    info!(
        "Configuration loaded: bind_addr={}, db_path={}",
        config.bind_addr,
        config.db_path.display()
    );

    let pool = if config.is_in_memory() {
        warn!("Using an in-memory database; all data is lost on exit");
        create_memory_pool().await?
    } else {
        let db_path = &config.db_path;

        // Backup before migrations
        if db_path.exists() {
            let backup_path = backup_database(db_path)?;
            info!("Database backed up to: {}", backup_path.display());
        }

        let pool = create_pool(db_path).await?;
        info!("Running database migrations...");
        run_migrations(&pool).await?;
        info!("Migrations complete");
        pool
    };

    let app = create_app(pool).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
