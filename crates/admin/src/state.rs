//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::AnalyticsHub;

/// Application state shared across all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    analytics: AnalyticsHub,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool, analytics: AnalyticsHub) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                analytics,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn analytics(&self) -> &AnalyticsHub {
        &self.inner.analytics
    }
}
