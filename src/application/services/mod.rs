//! Business logic services for the application layer.

pub mod click_service;
pub mod link_service;
pub mod owner_service;

pub use click_service::ClickService;
pub use link_service::{AllocationPolicy, LinkService, RngFactory};
pub use owner_service::OwnerService;
