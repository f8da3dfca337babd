//! Click event model for asynchronous click tracking.

/// An in-memory representation of a redirect hit for async processing.
///
/// Passed from the redirect path to the background worker through a bounded
/// channel, so the redirect response never waits on the counter update.
///
/// # Usage Flow
///
/// 1. Created by [`crate::domain::click_worker::ClickRecorder::record`]
/// 2. Sent to the channel (non-blocking)
/// 3. Processed by [`crate::domain::click_worker::run_click_worker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub short_id: String,
}

impl ClickEvent {
    /// Creates a new click event for `short_id`.
    pub fn new(short_id: impl Into<String>) -> Self {
        Self {
            short_id: short_id.into(),
        }
    }
}
