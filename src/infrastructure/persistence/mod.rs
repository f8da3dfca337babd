//! Mapping store implementations.
//!
//! # Repositories
//!
//! - [`PgShortUrlRepository`] - Short URL namespace on PostgreSQL
//! - [`PgOwnerRepository`] - Owners on PostgreSQL, transactional cascade
//! - [`MemoryStore`] - Both traits over in-process concurrent maps

pub mod memory_store;
pub mod pg_owner_repository;
pub mod pg_short_url_repository;

pub use memory_store::MemoryStore;
pub use pg_owner_repository::PgOwnerRepository;
pub use pg_short_url_repository::PgShortUrlRepository;

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

/// Opens a PostgreSQL pool sized by the configuration.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Applies the embedded schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to migrate")?;

    tracing::info!("Database migrations applied");
    Ok(())
}
