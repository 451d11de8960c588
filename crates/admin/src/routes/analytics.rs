//! Live analytics stream.
//!
//! A single SSE endpoint that pushes counter snapshots to the dashboard:
//! one event immediately on connect, one per metric recorded in this
//! process, and a periodic database refresh to pick up activity the site
//! process wrote.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use sqlx::PgPool;
use tokio::sync::broadcast::error::RecvError;

use crate::db::{ConversationRepository, InvoiceRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::services::AnalyticsSnapshot;
use crate::state::AppState;

/// How often connected dashboards re-read the persisted counts.
const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/analytics/stream", get(stream_analytics))
}

/// Stream counter snapshots as server-sent events.
///
/// GET /api/analytics/stream
async fn stream_analytics(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let hub = state.analytics().clone();
    let pool = state.pool().clone();
    let mut receiver = hub.subscribe();

    // Visits and chats accrue in the site process, so refresh from the
    // database before handing out the opening snapshot
    hub.seed(db_snapshot(&pool).await?);

    let stream = async_stream::stream! {
        yield Ok(snapshot_event(hub.snapshot()));

        let mut refresh = tokio::time::interval(REFRESH_INTERVAL);
        refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; the opening snapshot covers it
        refresh.tick().await;

        loop {
            tokio::select! {
                update = receiver.recv() => match update {
                    Ok(snapshot) => yield Ok(snapshot_event(snapshot)),
                    // Dropped updates are fine, the current totals still win
                    Err(RecvError::Lagged(_)) => yield Ok(snapshot_event(hub.snapshot())),
                    Err(RecvError::Closed) => break,
                },
                _ = refresh.tick() => {
                    match db_snapshot(&pool).await {
                        Ok(snapshot) => {
                            hub.seed(snapshot);
                            yield Ok(snapshot_event(snapshot));
                        }
                        Err(e) => {
                            tracing::warn!("Analytics refresh failed: {e}");
                        }
                    }
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Read the persisted counter values.
async fn db_snapshot(pool: &PgPool) -> Result<AnalyticsSnapshot, RepositoryError> {
    let conversations = ConversationRepository::new(pool);
    let invoices = InvoiceRepository::new(pool);

    let (visits, chats, invoice_count) = tokio::try_join!(
        conversations.count(),
        conversations.count_messages(),
        invoices.count(),
    )?;

    Ok(AnalyticsSnapshot {
        visits: visits.try_into().unwrap_or_default(),
        chats: chats.try_into().unwrap_or_default(),
        invoices: invoice_count.try_into().unwrap_or_default(),
    })
}

fn snapshot_event(snapshot: AnalyticsSnapshot) -> Event {
    match serde_json::to_string(&snapshot) {
        Ok(json) => Event::default().data(json),
        Err(e) => {
            tracing::error!("Failed to serialize analytics snapshot: {e}");
            Event::default().data("{}")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes_counters() {
        let snapshot = AnalyticsSnapshot {
            visits: 12,
            chats: 3,
            invoices: 1,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"visits":12,"chats":3,"invoices":1}"#);
    }
}
