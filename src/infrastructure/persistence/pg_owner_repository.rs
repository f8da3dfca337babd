//! PostgreSQL implementation of the owner repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Owner, OwnerId};
use crate::domain::repositories::OwnerRepository;
use crate::error::AppError;

/// PostgreSQL repository for owners.
///
/// Cascading removal runs both deletes in one transaction, so a failure
/// never leaves an owner without its short URLs removed or the reverse.
pub struct PgOwnerRepository {
    pool: Arc<PgPool>,
}

impl PgOwnerRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerRepository for PgOwnerRepository {
    async fn create(&self, id: OwnerId) -> Result<Owner, AppError> {
        let created_at: DateTime<Utc> =
            sqlx::query_scalar("INSERT INTO owners (id) VALUES ($1) RETURNING created_at")
                .bind(id.as_bytes())
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(Owner::new(id, created_at))
    }

    async fn exists(&self, id: OwnerId) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM owners WHERE id = $1)")
            .bind(id.as_bytes())
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(exists)
    }

    async fn delete_cascade(&self, id: OwnerId) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let short_urls = sqlx::query("DELETE FROM short_urls WHERE owner_id = $1")
            .bind(id.as_bytes())
            .execute(&mut *tx)
            .await?;

        let owners = sqlx::query("DELETE FROM owners WHERE id = $1")
            .bind(id.as_bytes())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            owner = %id,
            short_urls = short_urls.rows_affected(),
            "Owner cascade delete committed"
        );

        Ok(owners.rows_affected() > 0)
    }
}
