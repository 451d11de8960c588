//! Harvestline Core - Shared types library.
//!
//! This crate provides common types used across all Harvestline components:
//! - `site` - Public marketing site and AI chat widget backend
//! - `admin` - Internal back-office (catalog, invoices, content, assets)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses
//! - [`nutrition`] - Nutrient aggregate math shared by the chat formulation
//!   flow and the admin recipe calculator

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod nutrition;
pub mod types;

pub use types::*;
