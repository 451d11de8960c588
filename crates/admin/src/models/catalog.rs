//! Catalog models as managed in the back-office.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use harvestline_core::nutrition::NutrientValue;
use harvestline_core::{IngredientId, ProductId};

/// A feed ingredient with its nutrient composition.
#[derive(Debug, Clone, Serialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Nutrient composition (name + percentage).
    pub compositions: Vec<NutrientValue>,
    pub key_benefits: Vec<String>,
    pub applications: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sellable product: an ingredient in a particular packaging at a price.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub ingredient_id: IngredientId,
    pub packaging: String,
    pub price: Decimal,
    /// Minimum order quantity.
    pub moq: i32,
    pub stock: i32,
    pub certifications: Vec<String>,
    pub images: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product joined with its ingredient's name, as product lists show it.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub ingredient_name: String,
}
