use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::broadcast;

use tripdesk_types::ChangeEvent;

use crate::aggregator::UnreadAggregator;
use crate::cache::CacheUpdate;
use crate::config::SyncConfig;
use crate::tasks::TaskGuard;

/// Background wiring that keeps the aggregator fresh.
///
/// Three long-lived tasks, all owned through [`TaskGuard`]s and therefore
/// aborted when the notifier drops:
///
/// - push events from the store → debounced refresh;
/// - fallback interval poll → immediate refresh (its first tick doubles as
///   the mount fetch);
/// - cross-surface cache updates → immediate refresh.
///
/// The host additionally calls [`wake`](ChangeNotifier::wake) when its
/// window regains visibility.
pub struct ChangeNotifier {
    aggregator: Arc<UnreadAggregator>,
    _tasks: Vec<TaskGuard>,
}

impl ChangeNotifier {
    pub fn spawn(
        aggregator: Arc<UnreadAggregator>,
        events: BoxStream<'static, ChangeEvent>,
        cache_updates: broadcast::Receiver<CacheUpdate>,
        config: &SyncConfig,
    ) -> Self {
        let mut tasks = Vec::with_capacity(3);

        {
            let aggregator = aggregator.clone();
            let mut events = events;
            tasks.push(TaskGuard::spawn(async move {
                while let Some(event) = events.next().await {
                    tracing::trace!(?event, "change event received");
                    aggregator.refresh_debounced();
                }
                tracing::debug!("change event stream closed");
            }));
        }

        {
            let aggregator = aggregator.clone();
            let period = config.fallback_poll;
            tasks.push(TaskGuard::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                loop {
                    ticker.tick().await;
                    aggregator.refresh().await;
                }
            }));
        }

        {
            let aggregator = aggregator.clone();
            let mut updates = cache_updates;
            tasks.push(TaskGuard::spawn(async move {
                loop {
                    match updates.recv().await {
                        Ok(update) => {
                            tracing::trace!(thread_id = %update.thread_id, "cache update");
                            aggregator.refresh().await;
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "cache update stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }));
        }

        Self {
            aggregator,
            _tasks: tasks,
        }
    }

    /// The hosting surface regained visibility; refresh right away.
    pub fn wake(&self) {
        let aggregator = self.aggregator.clone();
        tokio::spawn(async move {
            aggregator.refresh().await;
        });
    }
}
