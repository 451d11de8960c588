//! The formulation advice handler.
//!
//! Unlike the tool-loop handlers, formulation is a fixed pipeline: extract
//! the animal type from the visitor's message, score the catalog ingredients
//! against that animal's nutrient targets, then have the model write advice
//! grounded in the ranked list. The ranked list is also returned to the
//! widget so it can render ingredient cards next to the reply.

use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use harvestline_core::nutrition::{IngredientProfile, IngredientScore, recommend_ingredients};

use crate::config::BusinessConfig;
use crate::db::CatalogRepository;
use crate::llm::{LlmClient, Message};

use super::prompts::formulation_prompt;
use super::service::ChatError;

/// Ranked ingredients surfaced to the model and the widget.
const MAX_RECOMMENDATIONS: usize = 5;

/// Fallback when the animal type cannot be determined.
const UNKNOWN_ANIMAL_TYPE: &str = "unknown";

const EXTRACTION_SYSTEM_PROMPT: &str = "\
You extract the animal type from a visitor message about animal feed.

Respond with only the animal type in a few words, lowercase, e.g. \
\"broiler chicken\", \"dairy cattle\", \"tilapia\". If no animal is \
mentioned, respond with exactly \"unknown\".";

/// Result of the formulation pipeline.
#[derive(Debug)]
pub struct FormulationOutcome {
    /// The animal type extracted from the visitor's message.
    pub animal_type: String,
    /// Catalog ingredients ranked against the animal's nutrient targets.
    pub recommendations: Vec<IngredientScore>,
    /// The model's written advice.
    pub advice: String,
}

/// Run the formulation pipeline for the latest visitor message.
///
/// `messages` is the full conversation history in API format, ending with
/// the visitor's latest turn.
///
/// # Errors
///
/// Returns `ChatError::Database` if the catalog cannot be read and
/// `ChatError::Llm` if the advice call fails. Animal type extraction
/// failures do not error; they fall back to a general-purpose profile.
#[instrument(skip_all, fields(message_len = user_message.len()))]
pub async fn handle(
    llm: &LlmClient,
    pool: &PgPool,
    business: &BusinessConfig,
    messages: Vec<Message>,
    user_message: &str,
) -> Result<FormulationOutcome, ChatError> {
    let animal_type = extract_animal_type(llm, user_message).await;

    let ingredients = CatalogRepository::new(pool).list_ingredients().await?;
    let candidates: Vec<IngredientProfile> = ingredients
        .into_iter()
        .map(|i| IngredientProfile {
            name: i.name,
            composition: i.compositions,
        })
        .collect();

    let mut recommendations = recommend_ingredients(&animal_type, &candidates);
    recommendations.retain(|r| r.score > rust_decimal::Decimal::ZERO);
    recommendations.truncate(MAX_RECOMMENDATIONS);

    debug!(
        animal_type = %animal_type,
        recommendations = recommendations.len(),
        "Scored catalog ingredients"
    );

    let system = formulation_prompt(business, &animal_type, &recommendations);
    let response = llm.chat(messages, Some(system), None).await?;

    Ok(FormulationOutcome {
        animal_type,
        recommendations,
        advice: response.text(),
    })
}

/// Extract the animal type from the visitor's message.
///
/// Extraction failures fall back to `"unknown"`, which maps to the
/// general-purpose nutrient profile.
async fn extract_animal_type(llm: &LlmClient, message: &str) -> String {
    match llm
        .completion(Some(EXTRACTION_SYSTEM_PROMPT.to_string()), message)
        .await
    {
        Ok(animal) => {
            let animal = animal.trim().to_lowercase();
            if animal.is_empty() {
                UNKNOWN_ANIMAL_TYPE.to_string()
            } else {
                animal
            }
        }
        Err(e) => {
            warn!(error = %e, "Animal type extraction failed, using general profile");
            UNKNOWN_ANIMAL_TYPE.to_string()
        }
    }
}
