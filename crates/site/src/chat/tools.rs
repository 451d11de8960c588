//! Tool definitions for the chat handlers.
//!
//! Each handler exposes a tailored subset: the product handler only reads
//! the catalog, the sales handler additionally reads policies and business
//! details and can create draft invoices.

use serde_json::json;

use harvestline_core::ChatIntent;

use crate::llm::Tool;

/// Get the tool set for a handler intent.
#[must_use]
pub fn tools_for_intent(intent: ChatIntent) -> Vec<Tool> {
    match intent {
        ChatIntent::QuickProductInquiry => product_tools(),
        // Formulation runs outside the tool loop; if routed here anyway it
        // gets the sales tool set, same as the prompt fallback.
        ChatIntent::FormulationAdvice | ChatIntent::SalesInquiry => sales_tools(),
    }
}

/// Get catalog read tools for the product handler.
#[must_use]
pub fn product_tools() -> Vec<Tool> {
    vec![get_products_tool(), get_product_tool()]
}

/// Get the full sales tool set: catalog reads, policies, business details,
/// and draft invoice creation.
#[must_use]
pub fn sales_tools() -> Vec<Tool> {
    let mut tools = product_tools();
    tools.push(get_policies_tool());
    tools.push(get_business_info_tool());
    tools.push(create_draft_invoice_tool());
    tools
}

fn get_products_tool() -> Tool {
    Tool {
        name: "get_products".to_string(),
        description: "List products in the catalog. Returns product summaries \
            including name, ingredient, category, price, packaging, minimum \
            order quantity, and stock."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Optional search term matched against product and ingredient names"
                }
            }
        }),
    }
}

fn get_product_tool() -> Tool {
    Tool {
        name: "get_product".to_string(),
        description: "Get a single product by its exact name. Returns full \
            details including nutrient composition, certifications, and stock."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The product name, matched case-insensitively"
                }
            },
            "required": ["name"]
        }),
    }
}

fn get_policies_tool() -> Tool {
    Tool {
        name: "get_policies".to_string(),
        description: "Get the company's published policies: payment terms, \
            delivery, returns, and quality guarantees."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

fn get_business_info_tool() -> Tool {
    Tool {
        name: "get_business_info".to_string(),
        description: "Get company contact and bank details: name, email, \
            phone, address, and the bank account invoices are paid into."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

fn create_draft_invoice_tool() -> Tool {
    Tool {
        name: "create_draft_invoice".to_string(),
        description: "Create a draft invoice for a confirmed order. Every \
            product name must exist in the catalog; unit prices are taken \
            from the catalog and the invoice is due 30 days from issue. \
            Returns the invoice number and totals."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "client_name": {
                    "type": "string",
                    "description": "Full name of the client or company"
                },
                "client_email": {
                    "type": "string",
                    "description": "Client email address"
                },
                "client_address": {
                    "type": "string",
                    "description": "Client billing address"
                },
                "items": {
                    "type": "array",
                    "description": "Order lines",
                    "items": {
                        "type": "object",
                        "properties": {
                            "product_name": {
                                "type": "string",
                                "description": "Exact catalog product name"
                            },
                            "quantity": {
                                "type": "integer",
                                "description": "Number of units, at least 1",
                                "minimum": 1
                            }
                        },
                        "required": ["product_name", "quantity"]
                    },
                    "minItems": 1
                }
            },
            "required": ["client_name", "client_email", "client_address", "items"]
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_tools_are_read_only() {
        let names: Vec<_> = product_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["get_products", "get_product"]);
    }

    #[test]
    fn test_sales_tools_include_invoice_creation() {
        let tools = sales_tools();
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"create_draft_invoice"));
        assert!(names.contains(&"get_policies"));
        assert!(names.contains(&"get_business_info"));
    }

    #[test]
    fn test_tool_names_are_unique() {
        let tools = sales_tools();
        let mut names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn test_invoice_tool_requires_client_and_items() {
        let tool = sales_tools()
            .into_iter()
            .find(|t| t.name == "create_draft_invoice")
            .unwrap();
        let required = tool.input_schema["required"].as_array().unwrap();
        for field in ["client_name", "client_email", "client_address", "items"] {
            assert!(required.iter().any(|v| v == field), "missing {field}");
        }
    }

    #[test]
    fn test_intent_routing_picks_tool_sets() {
        assert_eq!(
            tools_for_intent(ChatIntent::QuickProductInquiry).len(),
            product_tools().len()
        );
        assert_eq!(
            tools_for_intent(ChatIntent::SalesInquiry).len(),
            sales_tools().len()
        );
    }
}
