//! Persistence for draft invoices created by the chat invoice tool.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;

use harvestline_core::{InvoiceId, InvoiceStatus};

use super::{RepositoryError, parse_jsonb, to_jsonb};
use crate::models::{BankInfo, Invoice, InvoiceItem, NewInvoice};

/// Attempts to find an unused invoice number before giving up.
const MAX_NUMBER_ATTEMPTS: usize = 3;

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i32,
    invoice_number: String,
    client_name: String,
    client_email: String,
    client_address: String,
    items: serde_json::Value,
    total_amount: Decimal,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    status: InvoiceStatus,
    bank_info: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = RepositoryError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let items: Vec<InvoiceItem> = parse_jsonb(row.items, "items")?;
        let bank_info: BankInfo = parse_jsonb(row.bank_info, "bank_info")?;
        Ok(Self {
            id: InvoiceId::new(row.id),
            invoice_number: row.invoice_number,
            client_name: row.client_name,
            client_email: row.client_email,
            client_address: row.client_address,
            items,
            total_amount: row.total_amount,
            issue_date: row.issue_date,
            due_date: row.due_date,
            status: row.status,
            bank_info,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Generate an invoice number: `INV-YYYYMM-XXXX` with a random suffix.
///
/// Uniqueness is enforced by the database constraint; collisions retry.
fn generate_invoice_number(issue_date: NaiveDate) -> String {
    let suffix: u16 = rand::rng().random_range(0..10_000);
    format!("INV-{}-{suffix:04}", issue_date.format("%Y%m"))
}

/// Repository for invoice writes from the chat flow.
pub struct InvoiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InvoiceRepository<'a> {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a draft invoice, assigning a fresh invoice number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a unique invoice number could
    /// not be found, `RepositoryError::Database` for other failures.
    pub async fn create_draft(&self, new: NewInvoice) -> Result<Invoice, RepositoryError> {
        let items = to_jsonb(&new.items, "items")?;
        let bank_info = to_jsonb(&new.bank_info, "bank_info")?;

        for attempt in 0..MAX_NUMBER_ATTEMPTS {
            let invoice_number = if new.invoice_number.is_empty() {
                generate_invoice_number(new.issue_date)
            } else {
                new.invoice_number.clone()
            };

            let result = sqlx::query_as::<_, InvoiceRow>(
                r"
                INSERT INTO invoice (invoice_number, client_name, client_email,
                                     client_address, items, total_amount,
                                     issue_date, due_date, status, bank_info)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id, invoice_number, client_name, client_email,
                          client_address, items, total_amount, issue_date,
                          due_date, status, bank_info, created_at, updated_at
                ",
            )
            .bind(&invoice_number)
            .bind(&new.client_name)
            .bind(&new.client_email)
            .bind(&new.client_address)
            .bind(&items)
            .bind(new.total_amount)
            .bind(new.issue_date)
            .bind(new.due_date)
            .bind(InvoiceStatus::Draft)
            .bind(&bank_info)
            .fetch_one(self.pool)
            .await;

            match result {
                Ok(row) => return row.try_into(),
                Err(sqlx::Error::Database(db_err))
                    if db_err.is_unique_violation()
                        && new.invoice_number.is_empty()
                        && attempt + 1 < MAX_NUMBER_ATTEMPTS =>
                {
                    // Random suffix collided; try again with a new one
                    continue;
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    return Err(RepositoryError::Conflict(format!(
                        "invoice number {invoice_number} already exists"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RepositoryError::Conflict(
            "could not allocate a unique invoice number".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_invoice_number_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).expect("valid date");
        let number = generate_invoice_number(date);
        assert!(number.starts_with("INV-202503-"));
        assert_eq!(number.len(), "INV-202503-0000".len());
    }
}
