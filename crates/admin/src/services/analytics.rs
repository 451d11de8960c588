//! In-process analytics counters with a broadcast fan-out.
//!
//! Mutation paths call [`AnalyticsHub::record`]; the SSE dashboard endpoint
//! subscribes and pushes each fresh snapshot to connected admins. Counters
//! are seeded from database counts at startup, so restarts do not zero the
//! dashboard.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::broadcast;

/// Broadcast buffer size; slow subscribers skip to the newest snapshot.
const CHANNEL_CAPACITY: usize = 64;

/// A counted event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Distinct chat widget visitors (conversations).
    Visits,
    /// Chat messages exchanged.
    Chats,
    /// Invoices created.
    Invoices,
}

/// Point-in-time counter values pushed to the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsSnapshot {
    pub visits: u64,
    pub chats: u64,
    pub invoices: u64,
}

struct HubInner {
    visits: AtomicU64,
    chats: AtomicU64,
    invoices: AtomicU64,
    sender: broadcast::Sender<AnalyticsSnapshot>,
}

/// Shared counter hub. Cheap to clone.
#[derive(Clone)]
pub struct AnalyticsHub {
    inner: Arc<HubInner>,
}

impl AnalyticsHub {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(HubInner {
                visits: AtomicU64::new(0),
                chats: AtomicU64::new(0),
                invoices: AtomicU64::new(0),
                sender,
            }),
        }
    }

    /// Overwrite the counters with database-derived values.
    pub fn seed(&self, snapshot: AnalyticsSnapshot) {
        self.inner.visits.store(snapshot.visits, Ordering::Relaxed);
        self.inner.chats.store(snapshot.chats, Ordering::Relaxed);
        self.inner
            .invoices
            .store(snapshot.invoices, Ordering::Relaxed);
    }

    /// Increment one counter and broadcast the new snapshot.
    ///
    /// Broadcasting with no subscribers is not an error.
    pub fn record(&self, metric: Metric) {
        let counter = match metric {
            Metric::Visits => &self.inner.visits,
            Metric::Chats => &self.inner.chats,
            Metric::Invoices => &self.inner.invoices,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        let _ = self.inner.sender.send(self.snapshot());
    }

    /// Current counter values.
    #[must_use]
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            visits: self.inner.visits.load(Ordering::Relaxed),
            chats: self.inner.chats.load(Ordering::Relaxed),
            invoices: self.inner.invoices.load(Ordering::Relaxed),
        }
    }

    /// Subscribe to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AnalyticsSnapshot> {
        self.inner.sender.subscribe()
    }
}

impl Default for AnalyticsHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_subscribers() {
        let hub = AnalyticsHub::new();
        hub.record(Metric::Invoices);
        hub.record(Metric::Invoices);
        assert_eq!(hub.snapshot().invoices, 2);
        assert_eq!(hub.snapshot().visits, 0);
    }

    #[test]
    fn test_seed_overwrites() {
        let hub = AnalyticsHub::new();
        hub.record(Metric::Chats);
        hub.seed(AnalyticsSnapshot {
            visits: 10,
            chats: 25,
            invoices: 3,
        });
        assert_eq!(
            hub.snapshot(),
            AnalyticsSnapshot {
                visits: 10,
                chats: 25,
                invoices: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_subscribers_receive_snapshots() {
        let hub = AnalyticsHub::new();
        let mut rx = hub.subscribe();

        hub.record(Metric::Visits);
        hub.record(Metric::Chats);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.visits, 1);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.chats, 1);
    }
}
