//! Background worker that applies queued click events.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{error, info, warn};

use crate::application::services::ClickService;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

/// Retries after the first failed attempt for one event.
const MAX_RETRIES: usize = 3;

/// Creates the bounded click queue.
pub fn click_channel(capacity: usize) -> (ClickRecorder, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ClickRecorder::new(tx), rx)
}

/// Sender side of the click queue.
///
/// Recording never blocks: when the queue is full the click is dropped.
#[derive(Debug, Clone)]
pub struct ClickRecorder {
    sender: mpsc::Sender<ClickEvent>,
}

impl ClickRecorder {
    pub fn new(sender: mpsc::Sender<ClickEvent>) -> Self {
        Self { sender }
    }

    /// Queues a click for `short_id`. Returns false if it was dropped.
    pub fn record(&self, short_id: &str) -> bool {
        match self.sender.try_send(ClickEvent::new(short_id)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(short_id = %event.short_id, "Click queue full, dropping click");
                metrics::counter!("shortener_clicks_dropped_total", "reason" => "full")
                    .increment(1);
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(short_id = %event.short_id, "Click queue closed, dropping click");
                metrics::counter!("shortener_clicks_dropped_total", "reason" => "closed")
                    .increment(1);
                false
            }
        }
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Consumes click events until every sender is dropped.
///
/// Up to `concurrency` events are applied at once. Store outages are retried
/// with exponential backoff; events that still fail are logged and dropped.
/// Returns after the channel closes and in-flight events finish.
pub async fn run_click_worker<R>(
    mut rx: mpsc::Receiver<ClickEvent>,
    click_service: Arc<ClickService<R>>,
    concurrency: usize,
) where
    R: ShortUrlRepository + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let service = click_service.clone();
        tasks.spawn(async move {
            process_click(&service, event).await;
            drop(permit);
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    info!("Click worker stopped");
}

async fn process_click<R: ShortUrlRepository>(service: &ClickService<R>, event: ClickEvent) {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(5)
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::start(
        strategy,
        || service.track(&event.short_id),
        |e: &AppError| matches!(e, AppError::StoreUnavailable { .. }),
    )
    .await;

    if let Err(e) = result {
        error!(short_id = %event.short_id, error = %e, "Failed to record click");
        metrics::counter!("shortener_clicks_dropped_total", "reason" => "store").increment(1);
    }
}
