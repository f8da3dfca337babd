//! Domain layer: entities, store contracts and click processing.
//!
//! # Architecture
//!
//! - [`entities`] - Owners and short URLs
//! - [`repositories`] - Store trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Bounded click queue and its background consumer
//!
//! # Click Processing Flow
//!
//! 1. A redirect resolves its target through
//!    [`crate::application::services::LinkService::get_full_url`]
//! 2. [`click_worker::ClickRecorder::record`] queues a [`click_event::ClickEvent`]
//! 3. [`click_worker::run_click_worker`] applies it with retry logic
//! 4. The counter is bumped via [`repositories::ShortUrlRepository::increment_clicks`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
