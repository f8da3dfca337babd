//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`Owner`] / [`OwnerId`] - An opaque owner of short URLs
//! - [`ShortUrl`] - A short code mapped to its redirect target
//!
//! Creation input uses a separate struct ([`NewShortUrl`]) so the store
//! decides timestamps and counters.

pub mod owner;
pub mod short_url;

pub use owner::{OWNER_ID_LEN, Owner, OwnerId};
pub use short_url::{NewShortUrl, ShortUrl};
