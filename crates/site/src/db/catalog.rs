//! Read access to the product catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use harvestline_core::nutrition::NutrientValue;
use harvestline_core::{IngredientId, ProductId};

use super::{RepositoryError, parse_jsonb};
use crate::models::{Ingredient, Product, ProductSummary};

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.ingredient_id, p.packaging, p.price, p.moq, p.stock,
           p.certifications, p.images, p.featured, p.created_at, p.updated_at,
           i.name AS ingredient_name, i.category AS ingredient_category,
           i.compositions
    FROM product p
    JOIN ingredient i ON i.id = p.ingredient_id
";

/// Internal row type for product queries joined with ingredient info.
#[derive(Debug, sqlx::FromRow)]
struct ProductSummaryRow {
    id: i32,
    name: String,
    ingredient_id: i32,
    packaging: String,
    price: Decimal,
    moq: i32,
    stock: i32,
    certifications: Vec<String>,
    images: Vec<String>,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    ingredient_name: String,
    ingredient_category: String,
    compositions: serde_json::Value,
}

impl TryFrom<ProductSummaryRow> for ProductSummary {
    type Error = RepositoryError;

    fn try_from(row: ProductSummaryRow) -> Result<Self, Self::Error> {
        let compositions: Vec<NutrientValue> = parse_jsonb(row.compositions, "compositions")?;
        Ok(Self {
            product: Product {
                id: ProductId::new(row.id),
                name: row.name,
                ingredient_id: IngredientId::new(row.ingredient_id),
                packaging: row.packaging,
                price: row.price,
                moq: row.moq,
                stock: row.stock,
                certifications: row.certifications,
                images: row.images,
                featured: row.featured,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            ingredient_name: row.ingredient_name,
            ingredient_category: row.ingredient_category,
            compositions,
        })
    }
}

/// Internal row type for ingredient queries.
#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: i32,
    name: String,
    description: String,
    category: String,
    compositions: serde_json::Value,
    key_benefits: Vec<String>,
    applications: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = RepositoryError;

    fn try_from(row: IngredientRow) -> Result<Self, Self::Error> {
        let compositions: Vec<NutrientValue> = parse_jsonb(row.compositions, "compositions")?;
        Ok(Self {
            id: IngredientId::new(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            compositions,
            key_benefits: row.key_benefits,
            applications: row.applications,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products with their ingredient info, featured first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} ORDER BY p.featured DESC, p.name ASC");
        let rows = sqlx::query_as::<_, ProductSummaryRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Search products by name or ingredient name (case-insensitive substring).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!(
            "{PRODUCT_SELECT} WHERE p.name ILIKE $1 OR i.name ILIKE $1 ORDER BY p.name ASC"
        );
        let rows = sqlx::query_as::<_, ProductSummaryRow>(&sql)
            .bind(format!("%{query}%"))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductSummary>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductSummaryRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(r.try_into()?)),
            None => Ok(None),
        }
    }

    /// Find a product by exact name, case-insensitively.
    ///
    /// The chat invoice tool resolves requested product names through this.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_product_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ProductSummary>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE lower(p.name) = lower($1)");
        let row = sqlx::query_as::<_, ProductSummaryRow>(&sql)
            .bind(name)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(r.try_into()?)),
            None => Ok(None),
        }
    }

    /// List all ingredients.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>, RepositoryError> {
        let rows = sqlx::query_as::<_, IngredientRow>(
            r"
            SELECT id, name, description, category, compositions,
                   key_benefits, applications, created_at, updated_at
            FROM ingredient
            ORDER BY name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an ingredient by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_ingredient(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, RepositoryError> {
        let row = sqlx::query_as::<_, IngredientRow>(
            r"
            SELECT id, name, description, category, compositions,
                   key_benefits, applications, created_at, updated_at
            FROM ingredient
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_into()?)),
            None => Ok(None),
        }
    }
}
