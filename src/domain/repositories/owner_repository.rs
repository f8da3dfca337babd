//! Repository trait for owner data access.

use crate::domain::entities::{Owner, OwnerId};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for owners.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    /// Persists a new owner with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the identifier already exists.
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    async fn create(&self, id: OwnerId) -> Result<Owner, AppError>;

    /// Returns true if the owner exists.
    async fn exists(&self, id: OwnerId) -> Result<bool, AppError>;

    /// Removes the owner together with all of its short URLs.
    ///
    /// Short URLs are removed no later than the owner row. The PostgreSQL
    /// implementation runs both deletes in one transaction.
    ///
    /// Returns `Ok(false)` if the owner did not exist. Orphaned short URLs
    /// referencing the id are still removed in that case.
    async fn delete_cascade(&self, id: OwnerId) -> Result<bool, AppError>;
}
