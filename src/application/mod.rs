//! Application layer services implementing business logic.
//!
//! Services consume repository traits and expose the operations callers use.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short code allocation, lookup and removal
//! - [`services::owner_service::OwnerService`] - Owner creation and cascading removal
//! - [`services::click_service::ClickService`] - Per-code redirect counting

pub mod services;
