//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, OwnerId, ShortUrl};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

/// PostgreSQL repository for the short URL namespace.
///
/// Uniqueness of `short_id` is enforced by the `short_urls_short_id_key`
/// constraint; a violation surfaces as [`AppError::Conflict`].
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ShortUrlRow {
    short_id: String,
    owner_id: Vec<u8>,
    url: String,
    clicks: Option<i64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ShortUrlRow> for ShortUrl {
    type Error = AppError;

    fn try_from(row: ShortUrlRow) -> Result<Self, Self::Error> {
        Ok(ShortUrl::new(
            row.short_id,
            OwnerId::from_slice(&row.owner_id)?,
            row.url,
            row.clicks,
            row.created_at,
        ))
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn count_by_short_id(&self, short_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_urls WHERE short_id = $1")
            .bind(short_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn insert(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let row: ShortUrlRow = sqlx::query_as(
            r#"
            INSERT INTO short_urls (short_id, owner_id, url)
            VALUES ($1, $2, $3)
            RETURNING short_id, owner_id, url, clicks, created_at
            "#,
        )
        .bind(&new_short_url.short_id)
        .bind(new_short_url.owner.as_bytes())
        .bind(&new_short_url.url)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<ShortUrl>, AppError> {
        let row: Option<ShortUrlRow> = sqlx::query_as(
            r#"
            SELECT short_id, owner_id, url, clicks, created_at
            FROM short_urls
            WHERE short_id = $1
            "#,
        )
        .bind(short_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrl::try_from).transpose()
    }

    async fn find_by_short_id_and_owner(
        &self,
        short_id: &str,
        owner: OwnerId,
    ) -> Result<Option<ShortUrl>, AppError> {
        let row: Option<ShortUrlRow> = sqlx::query_as(
            r#"
            SELECT short_id, owner_id, url, clicks, created_at
            FROM short_urls
            WHERE short_id = $1 AND owner_id = $2
            "#,
        )
        .bind(short_id)
        .bind(owner.as_bytes())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrl::try_from).transpose()
    }

    async fn find_all_by_owner(&self, owner: OwnerId) -> Result<Vec<ShortUrl>, AppError> {
        let rows: Vec<ShortUrlRow> = sqlx::query_as(
            r#"
            SELECT short_id, owner_id, url, clicks, created_at
            FROM short_urls
            WHERE owner_id = $1
            ORDER BY created_at DESC, short_id
            "#,
        )
        .bind(owner.as_bytes())
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(ShortUrl::try_from).collect()
    }

    async fn delete_by_short_id_and_owner(
        &self,
        short_id: &str,
        owner: OwnerId,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_urls WHERE short_id = $1 AND owner_id = $2")
            .bind(short_id)
            .bind(owner.as_bytes())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_by_owner(&self, owner: OwnerId) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM short_urls WHERE owner_id = $1")
            .bind(owner.as_bytes())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn increment_clicks(&self, short_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE short_urls SET clicks = COALESCE(clicks, 0) + 1 WHERE short_id = $1",
        )
        .bind(short_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
