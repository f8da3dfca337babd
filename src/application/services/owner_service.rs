//! Owner lifecycle service.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::domain::entities::{Owner, OwnerId};
use crate::domain::repositories::OwnerRepository;
use crate::error::AppError;

/// Service for creating and removing owners.
///
/// Removing an owner cascades to every short URL it owns.
pub struct OwnerService<R: OwnerRepository> {
    repository: Arc<R>,
}

impl<R: OwnerRepository> OwnerService<R> {
    /// Creates a new owner service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Creates a new owner with a freshly generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    pub async fn create_owner(&self) -> Result<OwnerId, AppError> {
        let owner: Owner = self.repository.create(OwnerId::generate()).await?;
        info!(owner = %owner.id, "Owner created");
        Ok(owner.id)
    }

    /// Returns true if the owner exists.
    pub async fn owner_exists(&self, owner: OwnerId) -> Result<bool, AppError> {
        self.repository.exists(owner).await
    }

    /// Removes an owner and all of its short URLs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the owner did not exist. Any short
    /// URLs still referencing the id have been removed regardless.
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    pub async fn remove_owner(&self, owner: OwnerId) -> Result<(), AppError> {
        if !self.repository.delete_cascade(owner).await? {
            return Err(AppError::not_found(
                "Owner not found",
                json!({ "owner": owner.to_string() }),
            ));
        }

        info!(owner = %owner, "Owner removed");
        Ok(())
    }
}
