//! Admin API route handlers.
//!
//! Route structure:
//! - `/api/auth/*` - login, logout, current admin
//! - `/api/products`, `/api/ingredients` - catalog CRUD
//! - `/api/policies`, `/api/blog`, `/api/team`, `/api/inquiries` - content
//! - `/api/invoices` - invoice CRUD and status transitions
//! - `/api/conversations` - chat transcript review
//! - `/api/admin-users` - account management (super admin only)
//! - `/api/assets` - asset records and presigned uploads
//! - `/api/nutrition/*` - nutrient aggregate calculators
//! - `/api/analytics/stream` - live counters over SSE
//!
//! All non-auth routes require a logged-in admin; mutations additionally
//! require a writing role.

pub mod admin_users;
pub mod analytics;
pub mod assets;
pub mod auth;
pub mod catalog;
pub mod content;
pub mod conversations;
pub mod invoices;
pub mod nutrition;

use axum::Router;

use crate::error::FieldError;
use crate::state::AppState;

/// Build the combined admin API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(catalog::router())
        .merge(content::router())
        .merge(invoices::router())
        .merge(conversations::router())
        .merge(admin_users::router())
        .merge(assets::router())
        .merge(nutrition::router())
        .merge(analytics::router())
}

// =============================================================================
// Field validation helpers
// =============================================================================

/// Require a non-empty trimmed string, recording a field error otherwise.
pub(crate) fn non_empty(errors: &mut Vec<FieldError>, field: &str, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, "is required"));
    }
    trimmed.to_string()
}

/// Require an absolute http(s) URL when a value is present.
pub(crate) fn optional_url(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    if let Some(v) = &value {
        match url::Url::parse(v) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => errors.push(FieldError::new(field, "must be an http(s) URL")),
        }
    }
    value
}

/// Require every entry to be an absolute http(s) URL.
pub(crate) fn url_list(
    errors: &mut Vec<FieldError>,
    field: &str,
    values: Vec<String>,
) -> Vec<String> {
    for (index, value) in values.iter().enumerate() {
        match url::Url::parse(value) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => errors.push(FieldError::new(
                &format!("{field}[{index}]"),
                "must be an http(s) URL",
            )),
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_trims_and_flags() {
        let mut errors = Vec::new();
        assert_eq!(non_empty(&mut errors, "name", "  Maize  "), "Maize");
        assert!(errors.is_empty());

        non_empty(&mut errors, "name", "   ");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn test_optional_url_accepts_https_and_empty() {
        let mut errors = Vec::new();
        assert_eq!(
            optional_url(
                &mut errors,
                "cover_image",
                Some("https://cdn.example/x.png".to_string())
            ),
            Some("https://cdn.example/x.png".to_string())
        );
        assert_eq!(optional_url(&mut errors, "cover_image", Some(String::new())), None);
        assert_eq!(optional_url(&mut errors, "cover_image", None), None);
        assert!(errors.is_empty());

        optional_url(&mut errors, "cover_image", Some("ftp://x".to_string()));
        optional_url(&mut errors, "cover_image", Some("not a url".to_string()));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_url_list_flags_each_bad_entry() {
        let mut errors = Vec::new();
        url_list(
            &mut errors,
            "images",
            vec!["https://cdn.example/a.png".to_string(), "nope".to_string()],
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "images[1]");
    }
}
