//! Harvestline admin library.
//!
//! Back-office JSON API: catalog, content, and invoice management, chat
//! transcript review, nutrition calculators, presigned asset uploads,
//! admin accounts with session auth, and a live analytics stream.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
