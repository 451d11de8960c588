//! Domain models for the public site.

pub mod catalog;
pub mod chat;
pub mod content;
pub mod invoice;

pub use catalog::{Ingredient, Product, ProductSummary};
pub use chat::{Conversation, ConversationMessage};
pub use content::{BlogPost, ContactInquiry, Policy, TeamMember};
pub use invoice::{BankInfo, Invoice, InvoiceItem, NewInvoice};
