//! Domain models for the admin back-office.

pub mod admin_user;
pub mod asset;
pub mod catalog;
pub mod chat;
pub mod content;
pub mod invoice;

pub use admin_user::{AdminUser, CurrentAdmin, session_keys};
pub use asset::Asset;
pub use catalog::{Ingredient, Product, ProductSummary};
pub use chat::{Conversation, ConversationMessage, ConversationSummary};
pub use content::{BlogPost, ContactInquiry, Policy, TeamMember};
pub use invoice::{BankInfo, Invoice, InvoiceItem, NewInvoice};
