/**
 * Server Configuration
 *
 * Loads the optional PostgreSQL connection from the environment.
 * Configuration errors are logged but never prevent startup: without a
 * database the server runs against the in-memory collaborators.
 */
use sqlx::PgPool;

/// Database configuration result
///
/// `None` means `DATABASE_URL` is unset or the connection failed; the
/// caller falls back to the in-memory collaborators.
pub type DatabaseConfig = Option<PgPool>;

/// Load and initialize the database connection pool.
///
/// Reads `DATABASE_URL`, creates the pool, and runs migrations. Any
/// failure is logged and degrades to `None`.
pub async fn load_database() -> DatabaseConfig {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory collaborators");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to in-memory collaborators");
            return None;
        }
    };

    match sqlx::migrate!().run(&pool).await {
        Ok(_) => {
            tracing::info!("Database migrations completed");
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {:?}", e);
            // migrations may simply have been applied already
            tracing::warn!("Continuing without migrations");
        }
    }

    Some(pool)
}
