use std::sync::Arc;

use crate::application::services::{AllocationPolicy, ClickService, LinkService, OwnerService};
use crate::domain::click_worker::ClickRecorder;
use crate::domain::repositories::{OwnerRepository, ShortUrlRepository};
use crate::error::AppError;
use crate::infrastructure::persistence::{PgOwnerRepository, PgShortUrlRepository};
use crate::utils::short_link::{ShortLinkBuilder, redirect_target};

/// Services wired over one mapping store.
///
/// Defaults to the PostgreSQL repositories; tests and embedders can plug in
/// [`crate::infrastructure::persistence::MemoryStore`] for both parameters.
/// Dropping every clone closes the click queue and lets the worker finish.
pub struct AppState<S = PgShortUrlRepository, O = PgOwnerRepository>
where
    S: ShortUrlRepository,
    O: OwnerRepository,
{
    pub owner_service: Arc<OwnerService<O>>,
    pub link_service: Arc<LinkService<S, O>>,
    pub click_service: Arc<ClickService<S>>,
    pub short_links: Arc<ShortLinkBuilder>,
    pub clicks: ClickRecorder,
    store: Arc<S>,
}

impl<S: ShortUrlRepository, O: OwnerRepository> Clone for AppState<S, O> {
    fn clone(&self) -> Self {
        Self {
            owner_service: self.owner_service.clone(),
            link_service: self.link_service.clone(),
            click_service: self.click_service.clone(),
            short_links: self.short_links.clone(),
            clicks: self.clicks.clone(),
            store: self.store.clone(),
        }
    }
}

impl<S: ShortUrlRepository, O: OwnerRepository> AppState<S, O> {
    pub fn new(
        short_url_repository: Arc<S>,
        owner_repository: Arc<O>,
        policy: AllocationPolicy,
        short_links: ShortLinkBuilder,
        clicks: ClickRecorder,
    ) -> Self {
        Self {
            owner_service: Arc::new(OwnerService::new(owner_repository.clone())),
            link_service: Arc::new(LinkService::new(
                short_url_repository.clone(),
                owner_repository,
                policy,
            )),
            click_service: Arc::new(ClickService::new(short_url_repository.clone())),
            short_links: Arc::new(short_links),
            clicks,
            store: short_url_repository,
        }
    }

    /// Round-trips the mapping store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] when the store cannot be reached.
    pub async fn health(&self) -> Result<(), AppError> {
        self.store.ping().await
    }

    /// Resolves `short_id` for a redirect and queues one click.
    ///
    /// `query` is the incoming request's query string, merged into the target.
    /// Without one the stored URL is returned exactly as stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown codes. Failed lookups are not
    /// counted.
    pub async fn resolve(&self, short_id: &str, query: Option<&str>) -> Result<String, AppError> {
        let url = self.link_service.get_full_url(short_id).await?;
        let target = redirect_target(&url, query);
        self.clicks.record(short_id);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::click_event::ClickEvent;
    use crate::domain::click_worker::{click_channel, run_click_worker};
    use crate::infrastructure::persistence::MemoryStore;
    use tokio::sync::mpsc;

    type MemoryState = AppState<MemoryStore, MemoryStore>;

    fn memory_state(store: &Arc<MemoryStore>) -> (MemoryState, mpsc::Receiver<ClickEvent>) {
        let (clicks, rx) = click_channel(100);
        let state = AppState::new(
            store.clone(),
            store.clone(),
            AllocationPolicy::default(),
            ShortLinkBuilder::new("https://brf.im").unwrap(),
            clicks,
        );
        (state, rx)
    }

    #[tokio::test]
    async fn test_health_on_memory_store() {
        let store = Arc::new(MemoryStore::new());
        let (state, _rx) = memory_state(&store);

        assert!(state.health().await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_counts_click_and_merges_query() {
        let store = Arc::new(MemoryStore::new());
        let (state, rx) = memory_state(&store);
        let worker = tokio::spawn(run_click_worker(rx, state.click_service.clone(), 1));

        let owner = state.owner_service.create_owner().await.unwrap();
        let short_id = state
            .link_service
            .create_short_url("", "https://example.com/a?x=1", owner)
            .await
            .unwrap();

        let target = state.resolve(&short_id, Some("utm=mail")).await.unwrap();
        assert_eq!(target, "https://example.com/a?x=1&utm=mail");

        let missing = state.resolve("missing", None).await;
        assert!(matches!(missing, Err(AppError::NotFound { .. })));

        let link_service = state.link_service.clone();
        drop(state);
        worker.await.unwrap();

        let stored = link_service.get_short_url(&short_id, owner).await.unwrap();
        assert_eq!(stored.clicks, Some(1));
    }

    #[tokio::test]
    async fn test_resolve_returns_stored_url_verbatim() {
        let store = Arc::new(MemoryStore::new());
        let (state, _rx) = memory_state(&store);

        let owner = state.owner_service.create_owner().await.unwrap();
        for url in ["https://example.com", "example.com/page"] {
            let short_id = state
                .link_service
                .create_short_url("", url, owner)
                .await
                .unwrap();

            assert_eq!(state.resolve(&short_id, None).await.unwrap(), url);
            assert_eq!(
                state.link_service.get_full_url(&short_id).await.unwrap(),
                url
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_relative_url_with_query() {
        let store = Arc::new(MemoryStore::new());
        let (state, _rx) = memory_state(&store);

        let owner = state.owner_service.create_owner().await.unwrap();
        let short_id = state
            .link_service
            .create_short_url("", "example.com/page", owner)
            .await
            .unwrap();

        let target = state.resolve(&short_id, Some("a=1")).await.unwrap();
        assert_eq!(target, "example.com/page?a=1");
    }

    #[tokio::test]
    async fn test_failed_resolve_queues_no_click() {
        let store = Arc::new(MemoryStore::new());
        let (state, _rx) = memory_state(&store);
        let before = state.clicks.capacity();

        let result = state.resolve("missing", Some("a=1")).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert_eq!(state.clicks.capacity(), before);
    }

    #[tokio::test]
    async fn test_successful_resolve_queues_one_click() {
        let store = Arc::new(MemoryStore::new());
        let (state, _rx) = memory_state(&store);

        let owner = state.owner_service.create_owner().await.unwrap();
        let short_id = state
            .link_service
            .create_short_url("", "https://example.com", owner)
            .await
            .unwrap();
        let before = state.clicks.capacity();

        state.resolve(&short_id, None).await.unwrap();

        assert_eq!(state.clicks.capacity(), before - 1);
    }
}
