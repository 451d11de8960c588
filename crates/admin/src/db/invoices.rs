//! Invoice persistence for the back-office.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;

use harvestline_core::{InvoiceId, InvoiceStatus};

use super::{RepositoryError, parse_jsonb, to_jsonb};
use crate::models::{BankInfo, Invoice, InvoiceItem, NewInvoice};

/// Attempts to find an unused invoice number before giving up.
const MAX_NUMBER_ATTEMPTS: usize = 3;

const INVOICE_COLUMNS: &str = "id, invoice_number, client_name, client_email, client_address, \
     items, total_amount, issue_date, due_date, status, bank_info, created_at, updated_at";

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

/// Repository for invoice reads and writes.
pub struct InvoiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InvoiceRepository<'a> {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List invoices, newest issue date first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Invoice>, RepositoryError> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoice ORDER BY issue_date DESC, id DESC");
        let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such invoice exists.
    pub async fn get(&self, id: InvoiceId) -> Result<Invoice, RepositoryError> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoice WHERE id = $1");
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Persist a draft invoice, assigning a fresh invoice number when none
    /// is given.
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

            let sql = format!(
                r"
                INSERT INTO invoice (invoice_number, client_name, client_email,
                                     client_address, items, total_amount,
                                     issue_date, due_date, status, bank_info)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING {INVOICE_COLUMNS}
                "
            );
            let result = sqlx::query_as::<_, InvoiceRow>(&sql)
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

    /// Move an invoice to a new lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such invoice exists.
    pub async fn update_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> Result<Invoice, RepositoryError> {
        let sql = format!(
            r"
            UPDATE invoice
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {INVOICE_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id.as_i32())
            .bind(status)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete an invoice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such invoice exists.
    pub async fn delete(&self, id: InvoiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM invoice WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all invoices (analytics snapshot seed).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM invoice")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_invoice_number_format() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 30).expect("valid date");
        let number = generate_invoice_number(date);
        assert!(number.starts_with("INV-202511-"));
        assert_eq!(number.len(), "INV-202511-0000".len());
    }
}
