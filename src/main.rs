//! Bootstrap binary: prepares the database the finance core runs against.
//!
//! Initializes logging, loads configuration, connects to the store, creates
//! tables and indexes, and seeds the default category set. The chat transport
//! runs as a separate process and consumes this crate as a library.

use dotenvy::dotenv;
use finance_buddy::config;
use finance_buddy::core::category;
use finance_buddy::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Initialize database
    let db = config::database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ensured."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the default category set
    let seeded = category::seed_default_categories(&db, &app_config.default_categories)
        .await
        .inspect_err(|e| error!("Failed to seed default categories: {}", e))?;

    info!(
        "Bootstrap complete: {} categories seeded, store ready at {}",
        seeded, app_config.database_url
    );

    Ok(())
}
