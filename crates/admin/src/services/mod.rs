//! Services: password auth, object storage presigning, analytics broadcast.

pub mod analytics;
pub mod auth;
pub mod storage;

pub use analytics::{AnalyticsHub, AnalyticsSnapshot, Metric};
pub use auth::{AuthError, MIN_PASSWORD_LENGTH, hash_password, validate_password, verify_password};
pub use storage::{PresignedUpload, presign_put};
