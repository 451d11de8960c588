//! System prompts for the conversation handlers.

use std::fmt::Write;

use harvestline_core::ChatIntent;
use harvestline_core::nutrition::IngredientScore;

use crate::config::BusinessConfig;

/// Build the system prompt for a tool-loop handler.
#[must_use]
pub fn system_prompt(intent: ChatIntent, business: &BusinessConfig) -> String {
    match intent {
        ChatIntent::QuickProductInquiry => product_prompt(business),
        // Formulation uses its own prompt built around the ranked
        // ingredients; if it ever lands here, treat it as sales.
        ChatIntent::FormulationAdvice | ChatIntent::SalesInquiry => sales_prompt(business),
    }
}

fn product_prompt(business: &BusinessConfig) -> String {
    format!(
        "You are the product assistant for {company}, an animal feed ingredient \
trading company. Answer questions about products in the catalog: prices, \
packaging, minimum order quantities, stock, certifications, and nutrient \
composition.\n\n\
Use the tools to look up real catalog data before answering. Never invent \
products or prices. If a product is not in the catalog, say so and suggest \
the closest matches the tools return.\n\n\
Keep answers short and factual. Quote prices exactly as the catalog returns \
them.",
        company = business.company_name
    )
}

fn sales_prompt(business: &BusinessConfig) -> String {
    format!(
        "You are the sales assistant for {company}, an animal feed ingredient \
trading company. Help visitors with quotes, bulk orders, payment terms, \
delivery, and company policies.\n\n\
Use the tools for catalog data, policies, and company details. When a visitor \
wants to order, confirm the products and quantities, then create a draft \
invoice with the create_draft_invoice tool and give them the invoice number. \
Invoices are due 30 days from issue.\n\n\
If a requested product is not in the catalog the invoice tool will say so; \
relay that to the visitor rather than guessing. Never invent prices or \
policies.",
        company = business.company_name
    )
}

/// Build the formulation system prompt around the ranked ingredient list.
#[must_use]
pub fn formulation_prompt(
    business: &BusinessConfig,
    animal_type: &str,
    recommendations: &[IngredientScore],
) -> String {
    let mut context = String::new();
    for rec in recommendations {
        let matched = if rec.matched.is_empty() {
            "none fully met".to_string()
        } else {
            rec.matched.join(", ")
        };
        let _ = writeln!(
            context,
            "- {} (match score {:.2}; meets: {})",
            rec.ingredient, rec.score, matched
        );
    }

    format!(
        "You are the feed formulation advisor for {company}. The visitor is \
asking about feed for: {animal_type}.\n\n\
Our nutritionist scored the catalog ingredients against this animal's \
nutrient requirements:\n{context}\n\
Base your advice on these ingredients only. Explain briefly why the top \
ones fit, mention sensible inclusion practice, and recommend the visitor \
confirm rations with a qualified nutritionist for precise formulations.",
        company = business.company_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn business() -> BusinessConfig {
        BusinessConfig {
            company_name: "Harvestline Trading Ltd.".to_string(),
            email: "sales@harvestline.example".to_string(),
            phone: "+254 700 000 000".to_string(),
            address: "Industrial Area, Nairobi".to_string(),
            bank_name: "Equity Bank".to_string(),
            bank_account_name: "Harvestline Trading Ltd.".to_string(),
            bank_account_number: "0000000000".to_string(),
            bank_currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_system_prompt_mentions_company() {
        for intent in [
            ChatIntent::QuickProductInquiry,
            ChatIntent::SalesInquiry,
            ChatIntent::FormulationAdvice,
        ] {
            let prompt = system_prompt(intent, &business());
            assert!(prompt.contains("Harvestline Trading Ltd."));
        }
    }

    #[test]
    fn test_sales_prompt_mentions_invoice_tool() {
        let prompt = system_prompt(ChatIntent::SalesInquiry, &business());
        assert!(prompt.contains("create_draft_invoice"));
        assert!(prompt.contains("30 days"));
    }

    #[test]
    fn test_formulation_prompt_lists_recommendations() {
        let recs = vec![IngredientScore {
            ingredient: "Fishmeal".to_string(),
            score: Decimal::ONE,
            matched: vec!["crude protein".to_string()],
        }];
        let prompt = formulation_prompt(&business(), "broiler chicken", &recs);
        assert!(prompt.contains("broiler chicken"));
        assert!(prompt.contains("Fishmeal"));
        assert!(prompt.contains("crude protein"));
    }
}
