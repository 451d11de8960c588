//! Chat tool registry and intent routing.
//!
//! These tests verify the widget's routing surface without calling the
//! hosted model API.

use harvestline_core::ChatIntent;
use harvestline_site::chat::{product_tools, sales_tools, tools_for_intent};

// =============================================================================
// Intent labels
// =============================================================================

#[test]
fn test_known_labels_parse_exactly() {
    assert_eq!(
        ChatIntent::parse_label("quick_product_inquiry"),
        ChatIntent::QuickProductInquiry
    );
    assert_eq!(
        ChatIntent::parse_label("formulation_advice"),
        ChatIntent::FormulationAdvice
    );
    assert_eq!(
        ChatIntent::parse_label("sales_inquiry"),
        ChatIntent::SalesInquiry
    );
}

#[test]
fn test_classifier_noise_falls_back_to_sales() {
    for label in ["", "unknown", "Quick_Product_Inquiry", "sales inquiry", "42"] {
        assert_eq!(
            ChatIntent::parse_label(label),
            ChatIntent::SalesInquiry,
            "label {label:?} should route to the sales handler"
        );
    }
}

#[test]
fn test_labels_round_trip() {
    for intent in [
        ChatIntent::QuickProductInquiry,
        ChatIntent::FormulationAdvice,
        ChatIntent::SalesInquiry,
    ] {
        assert_eq!(ChatIntent::parse_label(intent.label()), intent);
    }
}

// =============================================================================
// Tool registry
// =============================================================================

#[test]
fn test_product_handler_gets_catalog_reads_only() {
    let names: Vec<_> = tools_for_intent(ChatIntent::QuickProductInquiry)
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["get_products", "get_product"]);
}

#[test]
fn test_sales_handler_gets_invoice_creation() {
    let names: Vec<_> = tools_for_intent(ChatIntent::SalesInquiry)
        .into_iter()
        .map(|t| t.name)
        .collect();
    for expected in [
        "get_products",
        "get_product",
        "get_policies",
        "get_business_info",
        "create_draft_invoice",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {expected}");
    }
}

#[test]
fn test_every_tool_has_an_object_schema() {
    for tool in sales_tools() {
        assert_eq!(
            tool.input_schema["type"], "object",
            "{} schema must be an object",
            tool.name
        );
        assert!(!tool.description.is_empty(), "{} needs a description", tool.name);
    }
}

#[test]
fn test_invoice_tool_schema_pins_required_fields() {
    let tool = sales_tools()
        .into_iter()
        .find(|t| t.name == "create_draft_invoice")
        .expect("invoice tool registered");

    let required = tool.input_schema["required"]
        .as_array()
        .expect("required array");
    for field in ["client_name", "client_email", "client_address", "items"] {
        assert!(required.iter().any(|v| v == field), "missing {field}");
    }

    let item_schema = &tool.input_schema["properties"]["items"]["items"];
    assert_eq!(item_schema["required"][0], "product_name");
    assert_eq!(item_schema["required"][1], "quantity");
    assert_eq!(item_schema["properties"]["quantity"]["minimum"], 1);
}

#[test]
fn test_product_tools_are_a_subset_of_sales_tools() {
    let sales: Vec<_> = sales_tools().into_iter().map(|t| t.name).collect();
    for tool in product_tools() {
        assert!(sales.contains(&tool.name), "{} missing from sales", tool.name);
    }
}
