//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the mapping store. Concrete implementations live in
//! `crate::infrastructure::persistence`; mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`ShortUrlRepository`] - Short URL namespace: probe, insert, lookup, delete, click increment
//! - [`OwnerRepository`] - Owner lifecycle with cascading removal
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` (PostgreSQL) and `tests/allocation.rs` (in-memory).

pub mod owner_repository;
pub mod short_url_repository;

pub use owner_repository::OwnerRepository;
pub use short_url_repository::ShortUrlRepository;

#[cfg(test)]
pub use owner_repository::MockOwnerRepository;
#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
