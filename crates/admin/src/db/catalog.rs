//! Catalog CRUD: ingredients and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use harvestline_core::nutrition::NutrientValue;
use harvestline_core::{IngredientId, ProductId};

use super::{RepositoryError, conflict_on_unique, parse_jsonb, to_jsonb};
use crate::models::{Ingredient, Product, ProductSummary};

/// Fields accepted when creating or replacing an ingredient.
#[derive(Debug, Clone)]
pub struct IngredientInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub compositions: Vec<NutrientValue>,
    pub key_benefits: Vec<String>,
    pub applications: Vec<String>,
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub ingredient_id: IngredientId,
    pub packaging: String,
    pub price: Decimal,
    pub moq: i32,
    pub stock: i32,
    pub certifications: Vec<String>,
    pub images: Vec<String>,
    pub featured: bool,
}

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

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
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
}

impl From<ProductRow> for ProductSummary {
    fn from(row: ProductRow) -> Self {
        Self {
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
        }
    }
}

const INGREDIENT_COLUMNS: &str = "id, name, description, category, compositions, \
     key_benefits, applications, created_at, updated_at";

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.ingredient_id, p.packaging, p.price, p.moq, p.stock,
           p.certifications, p.images, p.featured, p.created_at, p.updated_at,
           i.name AS ingredient_name
    FROM product p
    JOIN ingredient i ON i.id = p.ingredient_id
";

/// Repository for catalog reads and writes.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // === Ingredients ===

    /// List all ingredients.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>, RepositoryError> {
        let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredient ORDER BY name ASC");
        let rows = sqlx::query_as::<_, IngredientRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an ingredient by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such ingredient exists.
    pub async fn get_ingredient(&self, id: IngredientId) -> Result<Ingredient, RepositoryError> {
        let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredient WHERE id = $1");
        let row = sqlx::query_as::<_, IngredientRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Insert a new ingredient.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the name is already taken.
    pub async fn create_ingredient(
        &self,
        input: IngredientInput,
    ) -> Result<Ingredient, RepositoryError> {
        let compositions = to_jsonb(&input.compositions, "compositions")?;
        let sql = format!(
            r"
            INSERT INTO ingredient (name, description, category, compositions,
                                    key_benefits, applications)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {INGREDIENT_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, IngredientRow>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&compositions)
            .bind(&input.key_benefits)
            .bind(&input.applications)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "ingredient name already exists"))?;

        row.try_into()
    }

    /// Replace an ingredient's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such ingredient exists,
    /// `RepositoryError::Conflict` when the new name is already taken.
    pub async fn update_ingredient(
        &self,
        id: IngredientId,
        input: IngredientInput,
    ) -> Result<Ingredient, RepositoryError> {
        let compositions = to_jsonb(&input.compositions, "compositions")?;
        let sql = format!(
            r"
            UPDATE ingredient
            SET name = $2, description = $3, category = $4, compositions = $5,
                key_benefits = $6, applications = $7, updated_at = now()
            WHERE id = $1
            RETURNING {INGREDIENT_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, IngredientRow>(&sql)
            .bind(id.as_i32())
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&compositions)
            .bind(&input.key_benefits)
            .bind(&input.applications)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "ingredient name already exists"))?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete an ingredient.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such ingredient exists,
    /// `RepositoryError::Conflict` while products still reference it.
    pub async fn delete_ingredient(&self, id: IngredientId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ingredient WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    RepositoryError::Conflict("ingredient is referenced by products".to_string())
                }
                other => other.into(),
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // === Products ===

    /// List all products with their ingredient name, featured first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} ORDER BY p.featured DESC, p.name ASC");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    pub async fn get_product(&self, id: ProductId) -> Result<ProductSummary, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the name is already taken or
    /// the referenced ingredient does not exist.
    pub async fn create_product(
        &self,
        input: ProductInput,
    ) -> Result<ProductSummary, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO product (name, ingredient_id, packaging, price, moq, stock,
                                 certifications, images, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(input.ingredient_id.as_i32())
        .bind(&input.packaging)
        .bind(input.price)
        .bind(input.moq)
        .bind(input.stock)
        .bind(&input.certifications)
        .bind(&input.images)
        .bind(input.featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| product_write_error(&e).unwrap_or_else(|| e.into()))?;

        self.get_product(ProductId::new(id)).await
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists, or
    /// `RepositoryError::Conflict` on a name or ingredient conflict.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: ProductInput,
    ) -> Result<ProductSummary, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product
            SET name = $2, ingredient_id = $3, packaging = $4, price = $5,
                moq = $6, stock = $7, certifications = $8, images = $9,
                featured = $10, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(input.ingredient_id.as_i32())
        .bind(&input.packaging)
        .bind(input.price)
        .bind(input.moq)
        .bind(input.stock)
        .bind(&input.certifications)
        .bind(&input.images)
        .bind(input.featured)
        .execute(self.pool)
        .await
        .map_err(|e| product_write_error(&e).unwrap_or_else(|| e.into()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_product(id).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Classify constraint failures on product writes.
fn product_write_error(err: &sqlx::Error) -> Option<RepositoryError> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if db_err.is_unique_violation() {
        return Some(RepositoryError::Conflict(
            "product name already exists".to_string(),
        ));
    }
    if db_err.is_foreign_key_violation() {
        return Some(RepositoryError::Conflict(
            "referenced ingredient does not exist".to_string(),
        ));
    }
    None
}
