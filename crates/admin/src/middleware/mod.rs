//! Session and authentication middleware.

pub mod auth;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, RequireSuperAdmin, clear_current_admin, ensure_can_write,
    set_current_admin,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
