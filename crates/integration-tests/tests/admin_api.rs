//! Live admin API flows.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied (hl-cli migrate)
//! - The admin server running (cargo run -p harvestline-admin)
//! - A seeded admin account, configured via `TEST_ADMIN_EMAIL` and
//!   `TEST_ADMIN_PASSWORD`
//!
//! Run with: cargo test -p harvestline-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the admin API (configurable via environment).
fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Log in with the seeded test account and return a cookie-carrying client.
async fn authenticated_client() -> Client {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client");

    let email = std::env::var("TEST_ADMIN_EMAIL").expect("TEST_ADMIN_EMAIL not set");
    let password = std::env::var("TEST_ADMIN_PASSWORD").expect("TEST_ADMIN_PASSWORD not set");

    let resp = client
        .post(format!("{}/api/auth/login", admin_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK, "login failed");

    client
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and seeded admin account"]
async fn test_wrong_password_is_rejected_without_detail() {
    let client = Client::new();
    let email = std::env::var("TEST_ADMIN_EMAIL").expect("TEST_ADMIN_EMAIL not set");

    let resp = client
        .post(format!("{}/api/auth/login", admin_base_url()))
        .json(&json!({ "email": email, "password": "definitely-wrong" }))
        .send()
        .await
        .expect("Failed to call login");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Failed to read body");
    // The message must not reveal whether the account exists
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_unauthenticated_requests_get_401() {
    let client = Client::new();

    for path in ["/api/products", "/api/invoices", "/api/conversations"] {
        let resp = client
            .get(format!("{}{path}", admin_base_url()))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded admin account"]
async fn test_me_reflects_the_session() {
    let client = authenticated_client().await;

    let resp = client
        .get(format!("{}/api/auth/me", admin_base_url()))
        .send()
        .await
        .expect("Failed to call /api/auth/me");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read body");
    assert!(body["admin"]["email"].is_string());

    // Logout clears the session
    let resp = client
        .post(format!("{}/api/auth/logout", admin_base_url()))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{}/api/auth/me", admin_base_url()))
        .send()
        .await
        .expect("Failed to call /api/auth/me");
    let body: Value = resp.json().await.expect("Failed to read body");
    assert!(body["admin"].is_null());
}

// =============================================================================
// Catalog and invoices
// =============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and seeded admin account"]
async fn test_ingredient_product_invoice_lifecycle() {
    let client = authenticated_client().await;
    let base_url = admin_base_url();
    let suffix = Uuid::new_v4();

    // Create an ingredient
    let resp = client
        .post(format!("{base_url}/api/ingredients"))
        .json(&json!({
            "name": format!("Test Meal {suffix}"),
            "category": "protein",
            "compositions": [{ "nutrient": "crude protein", "value": "46" }]
        }))
        .send()
        .await
        .expect("Failed to create ingredient");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let ingredient: Value = resp.json().await.expect("Failed to read ingredient");

    // Create a product priced off it
    let resp = client
        .post(format!("{base_url}/api/products"))
        .json(&json!({
            "name": format!("Test Meal 50kg {suffix}"),
            "ingredient_id": ingredient["id"],
            "packaging": "50kg bag",
            "price": "28.50",
            "moq": 10,
            "stock": 500
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product: Value = resp.json().await.expect("Failed to read product");

    // Invoice three units and check the money invariants on the wire
    let resp = client
        .post(format!("{base_url}/api/invoices"))
        .json(&json!({
            "client_name": "Integration Test Farm",
            "client_email": "buyer@example.com",
            "items": [{ "product_id": product["id"], "quantity": 3 }]
        }))
        .send()
        .await
        .expect("Failed to create invoice");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let invoice: Value = resp.json().await.expect("Failed to read invoice");

    assert_eq!(invoice["status"], "draft");
    assert_eq!(invoice["items"][0]["total_price"], "85.50");
    assert_eq!(invoice["total_amount"], "85.50");

    // Cleanup
    for (path, id) in [
        ("api/invoices", &invoice["id"]),
        ("api/products", &product["id"]),
        ("api/ingredients", &ingredient["id"]),
    ] {
        let resp = client
            .delete(format!("{base_url}/{path}/{id}"))
            .send()
            .await
            .expect("Failed to delete");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded admin account"]
async fn test_invoice_with_unknown_product_fails_validation() {
    let client = authenticated_client().await;

    let resp = client
        .post(format!("{}/api/invoices", admin_base_url()))
        .json(&json!({
            "client_name": "Integration Test Farm",
            "client_email": "buyer@example.com",
            "items": [{ "product_id": 999_999_999, "quantity": 1 }]
        }))
        .send()
        .await
        .expect("Failed to create invoice");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to read body");
    assert_eq!(body["fields"][0]["field"], "items[0].product_id");
}
