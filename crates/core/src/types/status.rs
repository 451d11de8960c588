//! Status and role enums shared across services.

use serde::{Deserialize, Serialize};

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "invoice_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Void,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Sent => write!(f, "sent"),
            Self::Paid => write!(f, "paid"),
            Self::Void => write!(f, "void"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            "void" => Ok(Self::Void),
            _ => Err(format!("invalid invoice status: {s}")),
        }
    }
}

/// Chat message role for the model integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "chat_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
    ToolUse,
    ToolResult,
}

/// Chat intent label produced by the classifier.
///
/// The classifier is a single cheap model call that returns one label as
/// plain text. Anything it produces that is not an exact known label maps
/// to [`ChatIntent::SalesInquiry`], so a misbehaving classifier can never
/// take the chat router down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatIntent {
    QuickProductInquiry,
    FormulationAdvice,
    SalesInquiry,
}

impl ChatIntent {
    /// Parse a classifier output label, falling back to the sales handler.
    #[must_use]
    pub fn parse_label(s: &str) -> Self {
        match s.trim() {
            "quick_product_inquiry" => Self::QuickProductInquiry,
            "formulation_advice" => Self::FormulationAdvice,
            // "sales_inquiry" and everything unrecognized
            _ => Self::SalesInquiry,
        }
    }

    /// The wire label for this intent.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::QuickProductInquiry => "quick_product_inquiry",
            Self::FormulationAdvice => "formulation_advice",
            Self::SalesInquiry => "sales_inquiry",
        }
    }
}

impl std::fmt::Display for ChatIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin user management.
    SuperAdmin,
    /// Full access to catalog, content, and invoices.
    Admin,
    /// Read-only access.
    Viewer,
}

impl AdminRole {
    /// Whether this role may mutate data.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }

    /// Whether this role may manage admin user accounts.
    #[must_use]
    pub const fn can_manage_users(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_parse_known_labels() {
        assert_eq!(
            ChatIntent::parse_label("quick_product_inquiry"),
            ChatIntent::QuickProductInquiry
        );
        assert_eq!(
            ChatIntent::parse_label("formulation_advice"),
            ChatIntent::FormulationAdvice
        );
        assert_eq!(
            ChatIntent::parse_label("sales_inquiry"),
            ChatIntent::SalesInquiry
        );
    }

    #[test]
    fn test_intent_parse_trims_whitespace() {
        assert_eq!(
            ChatIntent::parse_label("  formulation_advice\n"),
            ChatIntent::FormulationAdvice
        );
    }

    #[test]
    fn test_intent_parse_falls_back_to_sales() {
        assert_eq!(ChatIntent::parse_label(""), ChatIntent::SalesInquiry);
        assert_eq!(
            ChatIntent::parse_label("I think this is a product question"),
            ChatIntent::SalesInquiry
        );
        assert_eq!(
            ChatIntent::parse_label("QUICK_PRODUCT_INQUIRY"),
            ChatIntent::SalesInquiry
        );
    }

    #[test]
    fn test_invoice_status_roundtrip() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
            InvoiceStatus::Void,
        ] {
            let parsed: InvoiceStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_admin_role_permissions() {
        assert!(AdminRole::SuperAdmin.can_manage_users());
        assert!(!AdminRole::Admin.can_manage_users());
        assert!(AdminRole::Admin.can_write());
        assert!(!AdminRole::Viewer.can_write());
    }
}
