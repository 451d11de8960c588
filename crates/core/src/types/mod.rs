//! Core types for Harvestline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{PAYMENT_TERMS_DAYS, due_date, invoice_total, line_total};
pub use status::*;
