//! Short URL entity representing an owner-scoped code to URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::owner::OwnerId;

/// A persisted mapping from a short code to its redirect target.
///
/// `short_id` is unique across the whole namespace, not only per owner.
/// `clicks` stays `None` until the first redirect is tracked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortUrl {
    pub short_id: String,
    pub owner: OwnerId,
    pub url: String,
    pub clicks: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl ShortUrl {
    /// Creates a new ShortUrl instance.
    pub fn new(
        short_id: String,
        owner: OwnerId,
        url: String,
        clicks: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            short_id,
            owner,
            url,
            clicks,
            created_at,
        }
    }

    /// Click count, treating a never-tracked record as zero.
    pub fn click_count(&self) -> i64 {
        self.clicks.unwrap_or(0)
    }
}

/// Input data for persisting a freshly allocated short URL.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortUrl {
    pub short_id: String,
    pub owner: OwnerId,
    pub url: String,
}
