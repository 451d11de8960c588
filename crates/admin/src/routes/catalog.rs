//! Catalog CRUD routes: products and ingredients.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use harvestline_core::nutrition::NutrientValue;
use harvestline_core::{IngredientId, ProductId};

use super::{non_empty, url_list};
use crate::db::{CatalogRepository, IngredientInput, ProductInput};
use crate::error::{AppError, FieldError};
use crate::middleware::{RequireAdminAuth, ensure_can_write};
use crate::models::{Ingredient, ProductSummary};
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/api/ingredients",
            get(list_ingredients).post(create_ingredient),
        )
        .route(
            "/api/ingredients/{id}",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
}

// =============================================================================
// Products
// =============================================================================

/// Product create/replace payload.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub ingredient_id: i32,
    #[serde(default)]
    pub packaging: String,
    pub price: Decimal,
    #[serde(default = "default_moq")]
    pub moq: i32,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

const fn default_moq() -> i32 {
    1
}

impl ProductRequest {
    fn validate(self) -> Result<ProductInput, AppError> {
        let mut errors: Vec<FieldError> = Vec::new();

        let name = non_empty(&mut errors, "name", &self.name);
        if self.price <= Decimal::ZERO {
            errors.push(FieldError::new("price", "must be positive"));
        }
        if self.moq < 1 {
            errors.push(FieldError::new("moq", "must be at least 1"));
        }
        if self.stock < 0 {
            errors.push(FieldError::new("stock", "must not be negative"));
        }
        let images = url_list(&mut errors, "images", self.images);

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(ProductInput {
            name,
            ingredient_id: IngredientId::new(self.ingredient_id),
            packaging: self.packaging.trim().to_string(),
            price: self.price,
            moq: self.moq,
            stock: self.stock,
            certifications: self.certifications,
            images,
            featured: self.featured,
        })
    }
}

/// List products.
///
/// GET /api/products
async fn list_products(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductSummary>>, AppError> {
    let repo = CatalogRepository::new(state.pool());
    Ok(Json(repo.list_products().await?))
}

/// Get one product.
///
/// GET /api/products/:id
async fn get_product(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductSummary>, AppError> {
    let repo = CatalogRepository::new(state.pool());
    let product = repo
        .get_product(ProductId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("product {id}"), e))?;
    Ok(Json(product))
}

/// Create a product.
///
/// POST /api/products
async fn create_product(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductSummary>), AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = CatalogRepository::new(state.pool());
    let product = repo.create_product(input).await?;

    tracing::info!(product_id = %product.product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product.
///
/// PUT /api/products/:id
async fn update_product(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<ProductSummary>, AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = CatalogRepository::new(state.pool());
    let product = repo
        .update_product(ProductId::new(id), input)
        .await
        .map_err(|e| AppError::for_entity(&format!("product {id}"), e))?;
    Ok(Json(product))
}

/// Delete a product.
///
/// DELETE /api/products/:id
async fn delete_product(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ensure_can_write(&admin)?;

    let repo = CatalogRepository::new(state.pool());
    repo.delete_product(ProductId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("product {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Ingredients
// =============================================================================

/// Ingredient create/replace payload.
#[derive(Debug, Deserialize)]
pub struct IngredientRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub compositions: Vec<NutrientValue>,
    #[serde(default)]
    pub key_benefits: Vec<String>,
    #[serde(default)]
    pub applications: Vec<String>,
}

impl IngredientRequest {
    fn validate(self) -> Result<IngredientInput, AppError> {
        let mut errors: Vec<FieldError> = Vec::new();

        let name = non_empty(&mut errors, "name", &self.name);
        for (index, nutrient) in self.compositions.iter().enumerate() {
            if nutrient.nutrient.trim().is_empty() {
                errors.push(FieldError::new(
                    &format!("compositions[{index}].nutrient"),
                    "is required",
                ));
            }
            if nutrient.value < Decimal::ZERO {
                errors.push(FieldError::new(
                    &format!("compositions[{index}].value"),
                    "must not be negative",
                ));
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(IngredientInput {
            name,
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            compositions: self.compositions,
            key_benefits: self.key_benefits,
            applications: self.applications,
        })
    }
}

/// List ingredients.
///
/// GET /api/ingredients
async fn list_ingredients(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let repo = CatalogRepository::new(state.pool());
    Ok(Json(repo.list_ingredients().await?))
}

/// Get one ingredient.
///
/// GET /api/ingredients/:id
async fn get_ingredient(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Ingredient>, AppError> {
    let repo = CatalogRepository::new(state.pool());
    let ingredient = repo
        .get_ingredient(IngredientId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("ingredient {id}"), e))?;
    Ok(Json(ingredient))
}

/// Create an ingredient.
///
/// POST /api/ingredients
async fn create_ingredient(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<IngredientRequest>,
) -> Result<(StatusCode, Json<Ingredient>), AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = CatalogRepository::new(state.pool());
    let ingredient = repo.create_ingredient(input).await?;

    tracing::info!(ingredient_id = %ingredient.id, "Ingredient created");
    Ok((StatusCode::CREATED, Json(ingredient)))
}

/// Replace an ingredient.
///
/// PUT /api/ingredients/:id
async fn update_ingredient(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<IngredientRequest>,
) -> Result<Json<Ingredient>, AppError> {
    ensure_can_write(&admin)?;
    let input = request.validate()?;

    let repo = CatalogRepository::new(state.pool());
    let ingredient = repo
        .update_ingredient(IngredientId::new(id), input)
        .await
        .map_err(|e| AppError::for_entity(&format!("ingredient {id}"), e))?;
    Ok(Json(ingredient))
}

/// Delete an ingredient.
///
/// DELETE /api/ingredients/:id
async fn delete_ingredient(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ensure_can_write(&admin)?;

    let repo = CatalogRepository::new(state.pool());
    repo.delete_ingredient(IngredientId::new(id))
        .await
        .map_err(|e| AppError::for_entity(&format!("ingredient {id}"), e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_request() -> ProductRequest {
        ProductRequest {
            name: "Soybean Meal 50kg".to_string(),
            ingredient_id: 1,
            packaging: "50kg bag".to_string(),
            price: "42.50".parse().unwrap(),
            moq: 10,
            stock: 200,
            certifications: vec![],
            images: vec!["https://cdn.example/soy.png".to_string()],
            featured: false,
        }
    }

    #[test]
    fn test_product_request_valid() {
        let input = product_request().validate().unwrap();
        assert_eq!(input.name, "Soybean Meal 50kg");
        assert_eq!(input.ingredient_id, IngredientId::new(1));
    }

    #[test]
    fn test_product_request_collects_field_errors() {
        let mut request = product_request();
        request.name = "  ".to_string();
        request.price = Decimal::ZERO;
        request.moq = 0;

        let Err(AppError::Validation(errors)) = request.validate() else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"price"));
        assert!(fields.contains(&"moq"));
    }

    #[test]
    fn test_ingredient_request_rejects_negative_nutrient() {
        let request = IngredientRequest {
            name: "Maize".to_string(),
            description: String::new(),
            category: "grain".to_string(),
            compositions: vec![NutrientValue {
                nutrient: "Crude Protein".to_string(),
                value: "-1".parse().unwrap(),
            }],
            key_benefits: vec![],
            applications: vec![],
        };

        let Err(AppError::Validation(errors)) = request.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].field, "compositions[0].value");
    }
}
