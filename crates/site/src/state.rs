//! Shared application state for the site binary.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::llm::LlmClient;

/// Application state shared across request handlers.
///
/// Cheap to clone; all fields live behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    llm: LlmClient,
}

impl AppState {
    /// Build the application state.
    #[must_use]
    pub fn new(config: SiteConfig, pool: PgPool) -> Self {
        let llm = LlmClient::new(config.llm());
        Self {
            inner: Arc::new(AppStateInner { config, pool, llm }),
        }
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Model API client.
    #[must_use]
    pub fn llm(&self) -> &LlmClient {
        &self.inner.llm
    }
}
