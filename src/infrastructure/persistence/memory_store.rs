//! In-process mapping store.
//!
//! Implements both repository traits over concurrent maps. Used by tests and
//! by embedders that do not need durability. Uniqueness of `short_id` is
//! enforced atomically through the map's entry API, matching the guarantee
//! the PostgreSQL constraint gives.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;

use crate::domain::entities::{NewShortUrl, Owner, OwnerId, ShortUrl};
use crate::domain::repositories::{OwnerRepository, ShortUrlRepository};
use crate::error::AppError;

#[derive(Debug, Clone)]
struct StoredShortUrl {
    seq: u64,
    short_url: ShortUrl,
}

/// Concurrent in-memory store for owners and short URLs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    owners: DashMap<OwnerId, Owner>,
    short_urls: DashMap<String, StoredShortUrl>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored short URLs across all owners.
    pub fn short_url_count(&self) -> usize {
        self.short_urls.len()
    }

    /// Number of stored owners.
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }
}

#[async_trait]
impl ShortUrlRepository for MemoryStore {
    async fn count_by_short_id(&self, short_id: &str) -> Result<i64, AppError> {
        Ok(i64::from(self.short_urls.contains_key(short_id)))
    }

    async fn insert(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        match self.short_urls.entry(new_short_url.short_id) {
            Entry::Occupied(entry) => Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "short_urls_short_id_key", "short_id": entry.key() }),
            )),
            Entry::Vacant(entry) => {
                let short_url = ShortUrl::new(
                    entry.key().clone(),
                    new_short_url.owner,
                    new_short_url.url,
                    None,
                    Utc::now(),
                );
                entry.insert(StoredShortUrl {
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    short_url: short_url.clone(),
                });
                Ok(short_url)
            }
        }
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<ShortUrl>, AppError> {
        Ok(self
            .short_urls
            .get(short_id)
            .map(|stored| stored.short_url.clone()))
    }

    async fn find_by_short_id_and_owner(
        &self,
        short_id: &str,
        owner: OwnerId,
    ) -> Result<Option<ShortUrl>, AppError> {
        Ok(self
            .short_urls
            .get(short_id)
            .filter(|stored| stored.short_url.owner == owner)
            .map(|stored| stored.short_url.clone()))
    }

    async fn find_all_by_owner(&self, owner: OwnerId) -> Result<Vec<ShortUrl>, AppError> {
        let mut owned: Vec<StoredShortUrl> = self
            .short_urls
            .iter()
            .filter(|entry| entry.short_url.owner == owner)
            .map(|entry| entry.value().clone())
            .collect();

        owned.sort_by(|a, b| b.seq.cmp(&a.seq));

        Ok(owned.into_iter().map(|stored| stored.short_url).collect())
    }

    async fn delete_by_short_id_and_owner(
        &self,
        short_id: &str,
        owner: OwnerId,
    ) -> Result<bool, AppError> {
        Ok(self
            .short_urls
            .remove_if(short_id, |_, stored| stored.short_url.owner == owner)
            .is_some())
    }

    async fn delete_all_by_owner(&self, owner: OwnerId) -> Result<u64, AppError> {
        let mut removed = 0;
        self.short_urls.retain(|_, stored| {
            let keep = stored.short_url.owner != owner;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn increment_clicks(&self, short_id: &str) -> Result<bool, AppError> {
        match self.short_urls.get_mut(short_id) {
            Some(mut stored) => {
                let clicks = &mut stored.short_url.clicks;
                *clicks = Some(clicks.unwrap_or(0) + 1);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl OwnerRepository for MemoryStore {
    async fn create(&self, id: OwnerId) -> Result<Owner, AppError> {
        match self.owners.entry(id) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "owners_pkey", "owner": id.to_string() }),
            )),
            Entry::Vacant(entry) => {
                let owner = Owner::new(id, Utc::now());
                entry.insert(owner.clone());
                Ok(owner)
            }
        }
    }

    async fn exists(&self, id: OwnerId) -> Result<bool, AppError> {
        Ok(self.owners.contains_key(&id))
    }

    async fn delete_cascade(&self, id: OwnerId) -> Result<bool, AppError> {
        // Short URLs first: an owner row never outlives its short URLs.
        self.delete_all_by_owner(id).await?;
        Ok(self.owners.remove(&id).is_some())
    }
}
