//! Repository trait for short URL data access.

use crate::domain::entities::{NewShortUrl, OwnerId, ShortUrl};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the short URL namespace.
///
/// Lookups use exact-match filters on `short_id`, `owner`, or both.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Counts records whose `short_id` matches exactly.
    ///
    /// Used as a cheap collision probe before inserting. Not a substitute for
    /// the uniqueness check done by [`Self::insert`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn count_by_short_id(&self, short_id: &str) -> Result<i64, AppError>;

    /// Persists a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if `short_id` is already taken.
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn insert(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Finds a record by code regardless of owner.
    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<ShortUrl>, AppError>;

    /// Finds a record by code, only if it belongs to `owner`.
    async fn find_by_short_id_and_owner(
        &self,
        short_id: &str,
        owner: OwnerId,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Lists every record of an owner, newest first.
    async fn find_all_by_owner(&self, owner: OwnerId) -> Result<Vec<ShortUrl>, AppError>;

    /// Deletes one record of an owner.
    ///
    /// Returns `Ok(true)` if a record was removed, `Ok(false)` if nothing matched.
    async fn delete_by_short_id_and_owner(
        &self,
        short_id: &str,
        owner: OwnerId,
    ) -> Result<bool, AppError>;

    /// Deletes every record of an owner and returns how many were removed.
    async fn delete_all_by_owner(&self, owner: OwnerId) -> Result<u64, AppError>;

    /// Atomically increments `clicks` on the matching record.
    ///
    /// Returns `Ok(false)` when no record matched. That is not an error.
    async fn increment_clicks(&self, short_id: &str) -> Result<bool, AppError>;

    /// Round-trips to the store to check it is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
