//! Tool executor for the chat handlers.
//!
//! Maps tool calls the model makes onto catalog reads, policy reads,
//! business config, and draft invoice creation. Results are JSON strings
//! fed back to the model as tool results.

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;

use harvestline_core::{due_date, invoice_total, line_total};

use crate::config::BusinessConfig;
use crate::db::{CatalogRepository, ContentRepository, InvoiceRepository};
use crate::llm::LlmError;
use crate::models::{BankInfo, InvoiceItem, NewInvoice, ProductSummary};

/// Executor for chat tools.
pub struct ToolExecutor<'a> {
    pool: &'a PgPool,
    business: &'a BusinessConfig,
}

impl<'a> ToolExecutor<'a> {
    /// Create a new tool executor.
    #[must_use]
    pub const fn new(pool: &'a PgPool, business: &'a BusinessConfig) -> Self {
        Self { pool, business }
    }

    /// Execute a tool and return the result as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::ToolExecution` for unknown tools, malformed input,
    /// or failed operations. The chat loop converts these into error tool
    /// results rather than aborting the conversation.
    #[instrument(skip(self, input), fields(tool_name = %name))]
    pub async fn execute(&self, name: &str, input: &serde_json::Value) -> Result<String, LlmError> {
        match name {
            "get_products" => self.get_products(input).await,
            "get_product" => self.get_product(input).await,
            "get_policies" => self.get_policies().await,
            "get_business_info" => Ok(self.get_business_info()),
            "create_draft_invoice" => self.create_draft_invoice(input).await,
            _ => Err(LlmError::ToolExecution(format!("Unknown tool: {name}"))),
        }
    }

    async fn get_products(&self, input: &serde_json::Value) -> Result<String, LlmError> {
        let repo = CatalogRepository::new(self.pool);

        let products = match input["query"].as_str().map(str::trim) {
            Some(query) if !query.is_empty() => repo
                .search_products(query)
                .await
                .map_err(|e| LlmError::ToolExecution(format!("Failed to get products: {e}")))?,
            _ => repo
                .list_products()
                .await
                .map_err(|e| LlmError::ToolExecution(format!("Failed to get products: {e}")))?,
        };

        let summaries: Vec<serde_json::Value> = products.iter().map(product_summary_json).collect();

        serde_json::to_string_pretty(&json!({
            "count": summaries.len(),
            "products": summaries,
        }))
        .map_err(|e| LlmError::ToolExecution(format!("Failed to serialize: {e}")))
    }

    async fn get_product(&self, input: &serde_json::Value) -> Result<String, LlmError> {
        let name = input["name"]
            .as_str()
            .ok_or_else(|| LlmError::ToolExecution("Missing required field: name".to_string()))?;

        let repo = CatalogRepository::new(self.pool);
        let result = repo
            .find_product_by_name(name)
            .await
            .map_err(|e| LlmError::ToolExecution(format!("Failed to get product: {e}")))?;

        match result {
            None => {
                // Offer close matches so the model can correct the name
                let similar = repo
                    .search_products(name)
                    .await
                    .map_err(|e| LlmError::ToolExecution(format!("Failed to get product: {e}")))?;
                let names: Vec<&str> = similar
                    .iter()
                    .map(|p| p.product.name.as_str())
                    .take(5)
                    .collect();
                Ok(json!({
                    "error": "Product not found",
                    "similar_products": names,
                })
                .to_string())
            }
            Some(p) => {
                let nutrients: Vec<serde_json::Value> = p
                    .compositions
                    .iter()
                    .map(|c| json!({"nutrient": c.nutrient, "value": c.value}))
                    .collect();
                serde_json::to_string_pretty(&json!({
                    "product": {
                        "name": p.product.name,
                        "ingredient": p.ingredient_name,
                        "category": p.ingredient_category,
                        "price": p.product.price,
                        "packaging": p.product.packaging,
                        "moq": p.product.moq,
                        "stock": p.product.stock,
                        "certifications": p.product.certifications,
                        "composition": nutrients,
                    }
                }))
                .map_err(|e| LlmError::ToolExecution(format!("Failed to serialize: {e}")))
            }
        }
    }

    async fn get_policies(&self) -> Result<String, LlmError> {
        let repo = ContentRepository::new(self.pool);
        let policies = repo
            .list_policies()
            .await
            .map_err(|e| LlmError::ToolExecution(format!("Failed to get policies: {e}")))?;

        let summaries: Vec<serde_json::Value> = policies
            .iter()
            .map(|p| json!({"title": p.title, "content": p.content}))
            .collect();

        serde_json::to_string_pretty(&json!({
            "count": summaries.len(),
            "policies": summaries,
        }))
        .map_err(|e| LlmError::ToolExecution(format!("Failed to serialize: {e}")))
    }

    fn get_business_info(&self) -> String {
        json!({
            "company_name": self.business.company_name,
            "email": self.business.email,
            "phone": self.business.phone,
            "address": self.business.address,
            "bank": {
                "bank_name": self.business.bank_name,
                "account_name": self.business.bank_account_name,
                "account_number": self.business.bank_account_number,
                "currency": self.business.bank_currency,
            }
        })
        .to_string()
    }

    async fn create_draft_invoice(&self, input: &serde_json::Value) -> Result<String, LlmError> {
        let client_name = require_str(input, "client_name")?;
        let client_email = require_str(input, "client_email")?;
        let client_address = require_str(input, "client_address")?;
        let requested = input["items"]
            .as_array()
            .filter(|items| !items.is_empty())
            .ok_or_else(|| {
                LlmError::ToolExecution("Invoice needs at least one item".to_string())
            })?;

        let catalog = CatalogRepository::new(self.pool);
        let mut items = Vec::with_capacity(requested.len());

        for line in requested {
            let product_name = require_str(line, "product_name")?;
            let quantity = line["quantity"]
                .as_u64()
                .filter(|q| *q > 0)
                .and_then(|q| u32::try_from(q).ok())
                .ok_or_else(|| {
                    LlmError::ToolExecution(format!(
                        "Invalid quantity for {product_name}: must be a positive integer"
                    ))
                })?;

            // Unknown products make the whole invoice fail; the model relays
            // the message instead of inventing a price
            let product = catalog
                .find_product_by_name(product_name)
                .await
                .map_err(|e| LlmError::ToolExecution(format!("Failed to look up product: {e}")))?
                .ok_or_else(|| {
                    LlmError::ToolExecution(format!(
                        "Product not found in catalog: {product_name}"
                    ))
                })?;

            let unit_price = product.product.price;
            items.push(InvoiceItem {
                product_id: product.product.id,
                product_name: product.product.name,
                quantity,
                unit_price,
                total_price: line_total(quantity, unit_price),
            });
        }

        let total_amount = invoice_total(items.iter().map(|i| i.total_price));
        let issue_date = Utc::now().date_naive();

        let new = NewInvoice {
            invoice_number: String::new(),
            client_name: client_name.to_string(),
            client_email: client_email.to_string(),
            client_address: client_address.to_string(),
            items,
            total_amount,
            issue_date,
            due_date: due_date(issue_date),
            bank_info: BankInfo {
                bank_name: self.business.bank_name.clone(),
                account_name: self.business.bank_account_name.clone(),
                account_number: self.business.bank_account_number.clone(),
                currency: self.business.bank_currency.clone(),
            },
        };

        let invoice = InvoiceRepository::new(self.pool)
            .create_draft(new)
            .await
            .map_err(|e| LlmError::ToolExecution(format!("Failed to create invoice: {e}")))?;

        let lines: Vec<serde_json::Value> = invoice
            .items
            .iter()
            .map(|i| {
                json!({
                    "product_name": i.product_name,
                    "quantity": i.quantity,
                    "unit_price": i.unit_price,
                    "total_price": i.total_price,
                })
            })
            .collect();

        serde_json::to_string_pretty(&json!({
            "invoice": {
                "invoice_number": invoice.invoice_number,
                "status": invoice.status,
                "client_name": invoice.client_name,
                "items": lines,
                "total_amount": invoice.total_amount,
                "issue_date": invoice.issue_date,
                "due_date": invoice.due_date,
                "bank": {
                    "bank_name": invoice.bank_info.bank_name,
                    "account_name": invoice.bank_info.account_name,
                    "account_number": invoice.bank_info.account_number,
                    "currency": invoice.bank_info.currency,
                }
            }
        }))
        .map_err(|e| LlmError::ToolExecution(format!("Failed to serialize: {e}")))
    }
}

fn product_summary_json(p: &ProductSummary) -> serde_json::Value {
    json!({
        "name": p.product.name,
        "ingredient": p.ingredient_name,
        "category": p.ingredient_category,
        "price": p.product.price,
        "packaging": p.product.packaging,
        "moq": p.product.moq,
        "stock": p.product.stock,
        "featured": p.product.featured,
    })
}

fn require_str<'v>(input: &'v serde_json::Value, field: &str) -> Result<&'v str, LlmError> {
    input[field]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LlmError::ToolExecution(format!("Missing required field: {field}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_require_str_rejects_missing_and_blank() {
        let input = json!({"client_name": "Acme Feeds", "client_email": "  "});
        assert_eq!(require_str(&input, "client_name").unwrap(), "Acme Feeds");
        assert!(require_str(&input, "client_email").is_err());
        assert!(require_str(&input, "client_address").is_err());
    }

    #[test]
    fn test_require_str_trims_whitespace() {
        let input = json!({"name": "  Soybean Meal 48%  "});
        assert_eq!(require_str(&input, "name").unwrap(), "Soybean Meal 48%");
    }
}
