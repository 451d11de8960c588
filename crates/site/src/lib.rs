//! Harvestline public site library.
//!
//! Serves the marketing site's JSON API and the AI chat widget backend:
//! catalog and content reads, contact inquiries, and the intent-routed
//! chat flow with its tools.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
