//! Redirect click counting service.

use std::sync::Arc;

use tracing::debug;

use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

/// Service that counts redirects per short code.
///
/// Independent of the allocation path. Tracking an unknown code succeeds
/// without effect.
pub struct ClickService<R: ShortUrlRepository> {
    repository: Arc<R>,
}

impl<R: ShortUrlRepository> ClickService<R> {
    /// Creates a new click service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Increments the click counter of `short_id` by one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    pub async fn track(&self, short_id: &str) -> Result<(), AppError> {
        if self.repository.increment_clicks(short_id).await? {
            metrics::counter!("shortener_clicks_tracked_total").increment(1);
        } else {
            debug!(short_id, "Click on unknown short id ignored");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockShortUrlRepository;
    use serde_json::json;

    #[tokio::test]
    async fn test_track_existing_code() {
        let mut mock_repo = MockShortUrlRepository::new();

        mock_repo
            .expect_increment_clicks()
            .withf(|short_id| short_id == "Ab3dE9x")
            .times(1)
            .returning(|_| Ok(true));

        let service = ClickService::new(Arc::new(mock_repo));

        assert!(service.track("Ab3dE9x").await.is_ok());
    }

    #[tokio::test]
    async fn test_track_unknown_code_is_not_an_error() {
        let mut mock_repo = MockShortUrlRepository::new();

        mock_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Ok(false));

        let service = ClickService::new(Arc::new(mock_repo));

        assert!(service.track("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_track_store_error() {
        let mut mock_repo = MockShortUrlRepository::new();

        mock_repo
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("Database error", json!({}))));

        let service = ClickService::new(Arc::new(mock_repo));

        let result = service.track("Ab3dE9x").await;
        assert!(matches!(result, Err(AppError::StoreUnavailable { .. })));
    }
}
