//! Intent classification for incoming chat messages.
//!
//! One cheap completion at temperature 0, expected to return exactly one
//! label. The router must never fail because of the classifier: parse
//! failures and API errors both fall back to the sales handler.

use tracing::{debug, instrument, warn};

use harvestline_core::ChatIntent;

use crate::llm::LlmClient;

const CLASSIFIER_SYSTEM_PROMPT: &str = "\
You classify visitor messages for an animal feed trading company's website chat.

Labels:
- quick_product_inquiry: asking about a specific product, its price, packaging, \
stock, or composition
- formulation_advice: asking what to feed an animal, how to formulate a ration, \
or which ingredients suit a species
- sales_inquiry: quotes, bulk orders, invoices, payment, delivery, policies, or \
anything else

Respond with exactly one label and nothing else.";

/// Classify the latest user turn.
///
/// Only the most recent user message is classified; earlier turns are
/// already reflected in the conversation the handler receives.
#[instrument(skip(llm, message), fields(message_len = message.len()))]
pub async fn classify(llm: &LlmClient, message: &str) -> ChatIntent {
    let user = format!("Classify this visitor message:\n\n{message}");

    match llm
        .completion(Some(CLASSIFIER_SYSTEM_PROMPT.to_string()), &user)
        .await
    {
        Ok(label) => {
            let intent = ChatIntent::parse_label(&label);
            debug!(label = %label.trim(), intent = %intent, "Classified chat message");
            intent
        }
        Err(e) => {
            warn!(error = %e, "Intent classification failed, routing to sales");
            ChatIntent::SalesInquiry
        }
    }
}
