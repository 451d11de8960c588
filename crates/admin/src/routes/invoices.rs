//! Invoice routes.
//!
//! Creation applies the same money invariants as the chat invoice tool:
//! line totals from quantity and the current unit price, the grand total as
//! their sum, and the due date 30 days after issue.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use harvestline_core::{Email, InvoiceId, InvoiceStatus, ProductId, due_date, invoice_total, line_total};

use super::non_empty;
use crate::db::{CatalogRepository, InvoiceRepository, RepositoryError};
use crate::error::{AppError, FieldError};
use crate::middleware::{RequireAdminAuth, ensure_can_write};
use crate::models::{BankInfo, Invoice, InvoiceItem, NewInvoice};
use crate::services::Metric;
use crate::state::AppState;

/// Build the invoice router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/api/invoices/{id}",
            get(get_invoice).delete(delete_invoice),
        )
        .route("/api/invoices/{id}/status", axum::routing::put(update_status))
}

/// One requested invoice line.
#[derive(Debug, Deserialize)]
pub struct InvoiceItemRequest {
    pub product_id: i32,
    pub quantity: u32,
}

/// Invoice create payload.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_name: String,
    pub client_email: String,
    #[serde(default)]
    pub client_address: String,
    pub items: Vec<InvoiceItemRequest>,
}

/// Status transition payload.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: InvoiceStatus,
}

/// GET /api/invoices
async fn list_invoices(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let repo = InvoiceRepository::new(state.pool());
    Ok(Json(repo.list().await?))
}

/// GET /api/invoices/:id
async fn get_invoice(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Invoice>, AppError> {
    let repo = InvoiceRepository::new(state.pool());
    let invoice = repo
        .get(InvoiceId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("invoice {id}"), e))?;
    Ok(Json(invoice))
}

/// Create a draft invoice from current catalog prices.
///
/// POST /api/invoices
async fn create_invoice(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    ensure_can_write(&admin)?;

    let mut errors: Vec<FieldError> = Vec::new();
    let client_name = non_empty(&mut errors, "client_name", &request.client_name);
    let client_email = match Email::parse(request.client_email.trim()) {
        Ok(email) => email.into_inner(),
        Err(e) => {
            errors.push(FieldError::new("client_email", e.to_string()));
            String::new()
        }
    };
    if request.items.is_empty() {
        errors.push(FieldError::new("items", "at least one item is required"));
    }
    for (index, item) in request.items.iter().enumerate() {
        if item.quantity == 0 {
            errors.push(FieldError::new(
                &format!("items[{index}].quantity"),
                "must be at least 1",
            ));
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Snapshot product names and prices line by line
    let catalog = CatalogRepository::new(state.pool());
    let mut items: Vec<InvoiceItem> = Vec::with_capacity(request.items.len());
    for (index, item) in request.items.iter().enumerate() {
        let product = catalog
            .get_product(ProductId::new(item.product_id))
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AppError::Validation(vec![FieldError::new(
                    &format!("items[{index}].product_id"),
                    "product does not exist",
                )]),
                other => AppError::Database(other),
            })?;

        items.push(InvoiceItem {
            product_id: product.product.id,
            product_name: product.product.name.clone(),
            quantity: item.quantity,
            unit_price: product.product.price,
            total_price: line_total(item.quantity, product.product.price),
        });
    }

    let total_amount = invoice_total(items.iter().map(|i| i.total_price));
    let issue_date = Utc::now().date_naive();
    let business = state.config().business();

    let repo = InvoiceRepository::new(state.pool());
    let invoice = repo
        .create_draft(NewInvoice {
            invoice_number: String::new(),
            client_name,
            client_email,
            client_address: request.client_address.trim().to_string(),
            items,
            total_amount,
            issue_date,
            due_date: due_date(issue_date),
            bank_info: BankInfo {
                bank_name: business.bank_name.clone(),
                account_name: business.bank_account_name.clone(),
                account_number: business.bank_account_number.clone(),
                currency: business.bank_currency.clone(),
            },
        })
        .await?;

    state.analytics().record(Metric::Invoices);
    tracing::info!(invoice_number = %invoice.invoice_number, "Invoice created");

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Move an invoice to a new lifecycle status.
///
/// PUT /api/invoices/:id/status
async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Invoice>, AppError> {
    ensure_can_write(&admin)?;

    let repo = InvoiceRepository::new(state.pool());
    let invoice = repo
        .update_status(InvoiceId::new(id), request.status)
        .await
        .map_err(|e| AppError::for_entity(&format!("invoice {id}"), e))?;
    Ok(Json(invoice))
}

/// DELETE /api/invoices/:id
async fn delete_invoice(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ensure_can_write(&admin)?;

    let repo = InvoiceRepository::new(state.pool());
    repo.delete(InvoiceId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("invoice {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}
