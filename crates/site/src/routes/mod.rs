//! HTTP route handlers for the public site API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database ping)
//!
//! # Catalog
//! GET  /api/products                    - Product listing (?q= to search)
//! GET  /api/products/{id}               - Product detail
//! GET  /api/ingredients                 - Ingredient listing
//! GET  /api/ingredients/{id}            - Ingredient detail
//!
//! # Content
//! GET  /api/policies                    - Company policies
//! GET  /api/blog                        - Published blog posts
//! GET  /api/blog/{slug}                 - Single published post
//! GET  /api/team                        - Team members
//!
//! # Contact
//! POST /api/contact                     - Submit a contact inquiry
//!
//! # Chat (rate limited per IP)
//! POST /api/chat                        - Send a chat message
//! GET  /api/chat/history/{visitor_key}  - Replay a visitor's conversation
//! ```

pub mod catalog;
pub mod chat;
pub mod contact;
pub mod content;

use axum::Router;

use crate::config::RateLimitConfig;
use crate::state::AppState;

/// Build the full public API router.
pub fn routes(rate_limit: &RateLimitConfig) -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(content::router())
        .merge(contact::router())
        .merge(chat::router(rate_limit))
}
