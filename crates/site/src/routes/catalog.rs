//! Catalog route handlers: products and ingredients.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use harvestline_core::{IngredientId, ProductId};

use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::models::{Ingredient, ProductSummary};
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/ingredients", get(list_ingredients))
        .route("/api/ingredients/{id}", get(get_ingredient))
}

/// Query parameters for product listing.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Search term matched against product and ingredient names.
    pub q: Option<String>,
}

/// List or search products.
///
/// GET /api/products?q=soybean
async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductQuery>,
) -> Result<Json<Vec<ProductSummary>>, AppError> {
    let repo = CatalogRepository::new(state.pool());

    let products = match params.q.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => repo.search_products(query).await?,
        _ => repo.list_products().await?,
    };

    Ok(Json(products))
}

/// Get a single product.
///
/// GET /api/products/:id
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductSummary>, AppError> {
    let repo = CatalogRepository::new(state.pool());
    let product = repo
        .get_product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}

/// List all ingredients.
///
/// GET /api/ingredients
async fn list_ingredients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let repo = CatalogRepository::new(state.pool());
    Ok(Json(repo.list_ingredients().await?))
}

/// Get a single ingredient.
///
/// GET /api/ingredients/:id
async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Ingredient>, AppError> {
    let repo = CatalogRepository::new(state.pool());
    let ingredient = repo
        .get_ingredient(IngredientId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ingredient {id}")))?;

    Ok(Json(ingredient))
}
