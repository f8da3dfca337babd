//! Runtime wiring for the PostgreSQL-backed service.
//!
//! Handles database connection, migrations, repository and service
//! construction, and click worker spawning.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;

use crate::application::services::AllocationPolicy;
use crate::config::Config;
use crate::domain::click_worker::{click_channel, run_click_worker};
use crate::infrastructure::persistence::{self, PgOwnerRepository, PgShortUrlRepository};
use crate::state::AppState;
use crate::utils::short_link::ShortLinkBuilder;

/// Builds the application state from validated configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Schema migrations
/// - Repositories and services
/// - Background click worker
///
/// The returned handle completes once every [`AppState`] clone is dropped
/// and the queued clicks are applied.
///
/// # Errors
///
/// Returns an error if the database is unreachable, a migration fails, or
/// `BASE_URL` is not a usable link origin.
pub async fn build(config: &Config) -> Result<(AppState, JoinHandle<()>)> {
    let short_links = ShortLinkBuilder::new(&config.base_url).context("Invalid BASE_URL")?;

    let pool = persistence::connect(config).await?;
    persistence::run_migrations(&pool).await?;

    let pool = Arc::new(pool);
    let short_url_repository = Arc::new(PgShortUrlRepository::new(pool.clone()));
    let owner_repository = Arc::new(PgOwnerRepository::new(pool));

    let (clicks, click_rx) = click_channel(config.click_queue_capacity);

    let state = AppState::new(
        short_url_repository,
        owner_repository,
        AllocationPolicy::from_config(config),
        short_links,
        clicks,
    );

    let worker = tokio::spawn(run_click_worker(
        click_rx,
        state.click_service.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.click_worker_concurrency,
        "Click worker started"
    );

    Ok((state, worker))
}
