//! Invoice models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use harvestline_core::{InvoiceId, InvoiceStatus, ProductId};

/// One line of an invoice.
///
/// `product_name` and `unit_price` are snapshots taken at issue time; later
/// catalog edits do not rewrite issued invoices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Bank details stamped onto an invoice at issue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankInfo {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub currency: String,
}

/// A persisted invoice.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub client_name: String,
    pub client_email: String,
    pub client_address: String,
    pub items: Vec<InvoiceItem>,
    pub total_amount: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub bank_info: BankInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a new draft invoice.
///
/// Totals and the due date are computed by the caller through the shared
/// money helpers before this struct is built.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Empty means allocate a fresh number.
    pub invoice_number: String,
    pub client_name: String,
    pub client_email: String,
    pub client_address: String,
    pub items: Vec<InvoiceItem>,
    pub total_amount: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub bank_info: BankInfo,
}
