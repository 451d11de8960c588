//! Nutrition calculator routes.
//!
//! Thin HTTP wrappers over the shared nutrition math: composition averages
//! across ingredients, a recipe cost and nutrient breakdown, and ingredient
//! recommendations for an animal type.

use axum::{Json, Router, extract::State, routing::post};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use harvestline_core::nutrition::{
    IngredientProfile, IngredientScore, NutrientAverage, RecipeBreakdown, RecipeLine,
    average_composition, recipe_breakdown, recommend_ingredients,
};
use harvestline_core::IngredientId;

use super::non_empty;
use crate::db::CatalogRepository;
use crate::error::{AppError, FieldError};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Build the nutrition router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/nutrition/averages", post(averages))
        .route("/api/nutrition/recipe", post(recipe))
        .route("/api/nutrition/recommend", post(recommend))
}

/// Ingredient selection for composition averaging.
#[derive(Debug, Deserialize)]
pub struct AveragesRequest {
    pub ingredient_ids: Vec<i32>,
}

/// One requested recipe line: an ingredient plus its inclusion rate and cost.
#[derive(Debug, Deserialize)]
pub struct RecipeLineRequest {
    pub ingredient_id: i32,
    pub inclusion_rate: Decimal,
    pub cost_per_unit: Decimal,
}

/// Recipe breakdown payload.
#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub batch_weight: Decimal,
    pub lines: Vec<RecipeLineRequest>,
}

/// Recommendation payload.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub animal_type: String,
}

/// Recommendation response with the animal type echoed back.
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub animal_type: String,
    pub recommended_ingredients: Vec<IngredientScore>,
}

/// Average nutrient composition across the selected ingredients.
///
/// POST /api/nutrition/averages
async fn averages(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<AveragesRequest>,
) -> Result<Json<Vec<NutrientAverage>>, AppError> {
    if request.ingredient_ids.is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "ingredient_ids",
            "at least one ingredient is required",
        )]));
    }

    let catalog = CatalogRepository::new(state.pool());
    let mut compositions = Vec::with_capacity(request.ingredient_ids.len());
    for (index, id) in request.ingredient_ids.iter().enumerate() {
        let ingredient = catalog
            .get_ingredient(IngredientId::new(*id))
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => {
                    AppError::Validation(vec![FieldError::new(
                        &format!("ingredient_ids[{index}]"),
                        "ingredient does not exist",
                    )])
                }
                other => AppError::Database(other),
            })?;
        compositions.push(ingredient.compositions);
    }

    let slices: Vec<&[_]> = compositions.iter().map(Vec::as_slice).collect();
    Ok(Json(average_composition(&slices)))
}

/// Per-line quantity, cost, and nutrient contributions for a recipe.
///
/// POST /api/nutrition/recipe
async fn recipe(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<RecipeRequest>,
) -> Result<Json<RecipeBreakdown>, AppError> {
    let mut errors: Vec<FieldError> = Vec::new();
    if request.batch_weight <= Decimal::ZERO {
        errors.push(FieldError::new("batch_weight", "must be positive"));
    }
    if request.lines.is_empty() {
        errors.push(FieldError::new("lines", "at least one line is required"));
    }
    for (index, line) in request.lines.iter().enumerate() {
        if line.inclusion_rate <= Decimal::ZERO {
            errors.push(FieldError::new(
                &format!("lines[{index}].inclusion_rate"),
                "must be positive",
            ));
        }
        if line.cost_per_unit < Decimal::ZERO {
            errors.push(FieldError::new(
                &format!("lines[{index}].cost_per_unit"),
                "must not be negative",
            ));
        }
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let catalog = CatalogRepository::new(state.pool());
    let mut lines: Vec<RecipeLine> = Vec::with_capacity(request.lines.len());
    for (index, line) in request.lines.iter().enumerate() {
        let ingredient = catalog
            .get_ingredient(IngredientId::new(line.ingredient_id))
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => {
                    AppError::Validation(vec![FieldError::new(
                        &format!("lines[{index}].ingredient_id"),
                        "ingredient does not exist",
                    )])
                }
                other => AppError::Database(other),
            })?;

        lines.push(RecipeLine {
            ingredient: ingredient.name,
            inclusion_rate: line.inclusion_rate,
            cost_per_unit: line.cost_per_unit,
            composition: ingredient.compositions,
        });
    }

    Ok(Json(recipe_breakdown(&lines, request.batch_weight)))
}

/// Rank catalog ingredients for an animal type.
///
/// POST /api/nutrition/recommend
async fn recommend(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let mut errors: Vec<FieldError> = Vec::new();
    let animal_type = non_empty(&mut errors, "animal_type", &request.animal_type);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let catalog = CatalogRepository::new(state.pool());
    let profiles: Vec<IngredientProfile> = catalog
        .list_ingredients()
        .await?
        .into_iter()
        .map(|ingredient| IngredientProfile {
            name: ingredient.name,
            composition: ingredient.compositions,
        })
        .collect();

    let recommended_ingredients = recommend_ingredients(&animal_type, &profiles);
    Ok(Json(RecommendResponse {
        animal_type,
        recommended_ingredients,
    }))
}
