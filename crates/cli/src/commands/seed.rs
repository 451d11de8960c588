//! Seed catalog data from a YAML file.
//!
//! The file declares ingredients and products; products reference their
//! ingredient by name. Existing rows (matched by unique name) are skipped,
//! so re-running the command is safe.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, warn};

use harvestline_admin::db::{
    self, CatalogRepository, IngredientInput, ProductInput, RepositoryError,
};
use harvestline_core::nutrition::NutrientValue;

/// Top-level seed file structure.
#[derive(Debug, Deserialize)]
struct CatalogSeed {
    #[serde(default)]
    ingredients: Vec<IngredientSeed>,
    #[serde(default)]
    products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
struct IngredientSeed {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    compositions: Vec<NutrientValue>,
    #[serde(default)]
    key_benefits: Vec<String>,
    #[serde(default)]
    applications: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProductSeed {
    name: String,
    /// Name of an ingredient declared above (or already in the database).
    ingredient: String,
    #[serde(default)]
    packaging: String,
    price: Decimal,
    #[serde(default = "default_moq")]
    moq: i32,
    #[serde(default)]
    stock: i32,
    #[serde(default)]
    certifications: Vec<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    featured: bool,
}

const fn default_moq() -> i32 {
    1
}

/// Seed ingredients and products from a YAML file.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or parsed, or database operations fail.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "ADMIN_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed file");

    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    info!(
        ingredients = seed.ingredients.len(),
        products = seed.products.len(),
        "Parsed seed file"
    );

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = CatalogRepository::new(&pool);

    let mut inserted_ingredients = 0usize;
    for ingredient in seed.ingredients {
        let result = repo
            .create_ingredient(IngredientInput {
                name: ingredient.name.clone(),
                description: ingredient.description,
                category: ingredient.category,
                compositions: ingredient.compositions,
                key_benefits: ingredient.key_benefits,
                applications: ingredient.applications,
            })
            .await;
        match result {
            Ok(_) => inserted_ingredients += 1,
            Err(RepositoryError::Conflict(_)) => {
                warn!(name = %ingredient.name, "Ingredient already exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Resolve product lines against the full ingredient list, seeded or not
    let ingredient_ids: HashMap<String, _> = repo
        .list_ingredients()
        .await?
        .into_iter()
        .map(|i| (i.name.to_lowercase(), i.id))
        .collect();

    let mut inserted_products = 0usize;
    for product in seed.products {
        let Some(&ingredient_id) = ingredient_ids.get(&product.ingredient.to_lowercase()) else {
            return Err(format!(
                "Product '{}' references unknown ingredient '{}'",
                product.name, product.ingredient
            )
            .into());
        };

        let result = repo
            .create_product(ProductInput {
                name: product.name.clone(),
                ingredient_id,
                packaging: product.packaging,
                price: product.price,
                moq: product.moq,
                stock: product.stock,
                certifications: product.certifications,
                images: product.images,
                featured: product.featured,
            })
            .await;
        match result {
            Ok(_) => inserted_products += 1,
            Err(RepositoryError::Conflict(_)) => {
                warn!(name = %product.name, "Product already exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeding complete!");
    info!("  Ingredients inserted: {inserted_ingredients}");
    info!("  Products inserted: {inserted_products}");

    Ok(())
}
