//! Integration tests for Harvestline.
//!
//! # Running Tests
//!
//! ```bash
//! # Library-level tests (no services required)
//! cargo test -p harvestline-integration-tests
//!
//! # Live API tests (require the servers and a migrated database)
//! cargo test -p harvestline-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `chat_tools` - Chat tool registry and intent routing
//! - `invoice_math` - Invoice money and date invariants
//! - `nutrition` - Nutrition aggregate calculations
//! - `presigned_uploads` - Object storage URL signing
//! - `admin_api` - Live admin API flows (ignored by default)

#![cfg_attr(not(test), forbid(unsafe_code))]
