#![allow(dead_code)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url_shortener_core::application::services::{
    AllocationPolicy, ClickService, LinkService, OwnerService,
};
use url_shortener_core::domain::click_event::ClickEvent;
use url_shortener_core::domain::click_worker::click_channel;
use url_shortener_core::domain::entities::OwnerId;
use url_shortener_core::infrastructure::persistence::MemoryStore;
use url_shortener_core::state::AppState;
use url_shortener_core::utils::short_link::ShortLinkBuilder;

pub type MemoryLinkService = LinkService<MemoryStore, MemoryStore>;

/// Services sharing one in-memory store.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub owners: OwnerService<MemoryStore>,
    pub links: MemoryLinkService,
    pub clicks: ClickService<MemoryStore>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(AllocationPolicy::default())
    }

    pub fn with_policy(policy: AllocationPolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            owners: OwnerService::new(store.clone()),
            links: LinkService::new(store.clone(), store.clone(), policy),
            clicks: ClickService::new(store.clone()),
            store,
        }
    }

    /// A second link service over the same store drawing from a fixed seed.
    pub fn seeded_links(&self, seed: u64, policy: AllocationPolicy) -> MemoryLinkService {
        seeded_link_service(&self.store, seed, policy)
    }
}

/// Link service whose every allocation replays the same candidate sequence.
pub fn seeded_link_service(
    store: &Arc<MemoryStore>,
    seed: u64,
    policy: AllocationPolicy,
) -> MemoryLinkService {
    LinkService::new(store.clone(), store.clone(), policy)
        .with_rng_factory(Arc::new(move || StdRng::seed_from_u64(seed)))
}

pub fn policy(max_attempts: u32, timeout: Duration) -> AllocationPolicy {
    AllocationPolicy {
        max_attempts,
        timeout,
        ..AllocationPolicy::default()
    }
}

pub fn create_memory_state() -> (
    AppState<MemoryStore, MemoryStore>,
    mpsc::Receiver<ClickEvent>,
) {
    let store = Arc::new(MemoryStore::new());
    let (clicks, rx) = click_channel(100);

    let state = AppState::new(
        store.clone(),
        store,
        AllocationPolicy::default(),
        ShortLinkBuilder::new("https://brf.im").unwrap(),
        clicks,
    );

    (state, rx)
}

pub async fn create_test_owner(pool: &PgPool) -> OwnerId {
    let owner = OwnerId::generate();
    sqlx::query("INSERT INTO owners (id) VALUES ($1)")
        .bind(owner.as_bytes())
        .execute(pool)
        .await
        .unwrap();
    owner
}

pub async fn create_test_short_url(pool: &PgPool, short_id: &str, owner: OwnerId, url: &str) {
    sqlx::query("INSERT INTO short_urls (short_id, owner_id, url) VALUES ($1, $2, $3)")
        .bind(short_id)
        .bind(owner.as_bytes())
        .bind(url)
        .execute(pool)
        .await
        .unwrap();
}
