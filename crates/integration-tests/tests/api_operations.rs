//! End-to-end operation tests over HTTP against the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use emporium_integration_tests::TestApp;

async fn create_customer(app: &TestApp, email: &str) -> i64 {
    let data = app
        .data(&json!({
            "operation": "createCustomer",
            "arguments": {"email": email, "username": "ana", "phone": "555-0100"}
        }))
        .await;
    assert_eq!(data["success"], true);
    data["customer"]["id"].as_i64().unwrap()
}

async fn create_product(app: &TestApp, name: &str, price: &str) -> i64 {
    let data = app
        .data(&json!({
            "operation": "createProduct",
            "arguments": {"name": name, "description": null, "price": price, "stock": 5}
        }))
        .await;
    data["product"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::in_memory();
    assert_eq!(app.get_status("/health").await, StatusCode::OK);
    assert_eq!(app.get_status("/health/ready").await, StatusCode::OK);
}

#[tokio::test]
async fn test_customer_lifecycle() {
    let app = TestApp::in_memory();
    create_customer(&app, "ana@example.com").await;

    let found = app
        .data(&json!({"operation": "customerByEmail", "arguments": {"email": "ana@example.com"}}))
        .await;
    assert_eq!(found["username"], "ana");
    assert!(found.get("password").is_none());
    assert!(found.get("passwordHash").is_none());

    let updated = app
        .data(&json!({
            "operation": "updateCustomer",
            "arguments": {"email": "ana@example.com", "phone": null}
        }))
        .await;
    assert_eq!(updated["success"], true);
    assert_eq!(updated["customer"]["username"], "ana");
    assert!(updated["customer"]["phone"].is_null());

    let deleted = app
        .data(&json!({"operation": "deleteCustomer", "arguments": {"email": "ana@example.com"}}))
        .await;
    assert_eq!(deleted["success"], true);
    assert_eq!(
        deleted["message"],
        "Customer with email ana@example.com deleted successfully"
    );

    let again = app
        .data(&json!({"operation": "deleteCustomer", "arguments": {"email": "ana@example.com"}}))
        .await;
    assert_eq!(again["success"], false);
    assert!(again["customer"].is_null());

    let gone = app
        .data(&json!({"operation": "customerByEmail", "arguments": {"email": "ana@example.com"}}))
        .await;
    assert!(gone.is_null());
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::in_memory();
    create_customer(&app, "ana@example.com").await;

    let (status, body) = app
        .call(&json!({
            "operation": "createCustomer",
            "arguments": {"email": "ana@example.com", "username": "other"}
        }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let all = app.data(&json!({"operation": "allCustomers"})).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_email_is_bad_request() {
    let app = TestApp::in_memory();
    let (status, _) = app
        .call(&json!({
            "operation": "createCustomer",
            "arguments": {"email": "not-an-email", "username": "x"}
        }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_requests() {
    let app = TestApp::in_memory();

    let (status, body) = app.post_raw("{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app.call(&json!({"operation": "dropEverything"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(&json!({
            "operation": "createProduct",
            "arguments": {"name": "Mug", "price": "-2.00", "stock": 1}
        }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stock_beyond_column_is_bad_request() {
    let app = TestApp::in_memory();
    let (status, body) = app
        .call(&json!({
            "operation": "createProduct",
            "arguments": {"name": "Mug", "price": "2.00", "stock": 3_000_000_000_u64}
        }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "invalid argument: stock must be at most 2147483647"
    );

    let listed = app.data(&json!({"operation": "allProducts"})).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_product_by_id() {
    let app = TestApp::in_memory();
    let id = create_product(&app, "Kettle", "30").await;

    let product = app
        .data(&json!({"operation": "productById", "arguments": {"id": id.to_string()}}))
        .await;
    assert_eq!(product["name"], "Kettle");
    assert_eq!(product["price"], "30.00");

    let (status, body) = app
        .call(&json!({"operation": "productById", "arguments": {"id": 999}}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "product 999 not found");
}

#[tokio::test]
async fn test_order_flow() {
    let app = TestApp::in_memory();
    let customer = create_customer(&app, "ana@example.com").await;
    let tea = create_product(&app, "Tea", "4.25").await;
    let mug = create_product(&app, "Mug", "9.99").await;

    let data = app
        .data(&json!({
            "operation": "createOrder",
            "arguments": {"userId": customer, "products": [tea, mug, tea, 4040]}
        }))
        .await;
    assert_eq!(data["success"], true);
    let order = &data["order"];
    assert_eq!(order["totalPrice"], "18.49");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["user"]["id"].as_i64(), Some(customer));
    assert_eq!(order["items"].as_array().unwrap().len(), 3);
    let names: Vec<&str> = order["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Tea", "Mug", "Tea"]);

    let order_id = order["id"].clone();
    let fetched = app
        .data(&json!({"operation": "orderById", "arguments": {"id": order_id}}))
        .await;
    assert_eq!(&fetched, order);

    let all: Value = app.data(&json!({"operation": "allOrders"})).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_order_rejections() {
    let app = TestApp::in_memory();
    let customer = create_customer(&app, "ana@example.com").await;
    let tea = create_product(&app, "Tea", "4.25").await;

    let (status, _) = app
        .call(&json!({
            "operation": "createOrder",
            "arguments": {"userId": customer, "products": [777]}
        }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .call(&json!({
            "operation": "createOrder",
            "arguments": {"userId": 31337, "products": [tea]}
        }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "customer 31337 not found");

    let all = app.data(&json!({"operation": "allOrders"})).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_customer_removes_orders() {
    let app = TestApp::in_memory();
    let customer = create_customer(&app, "ana@example.com").await;
    let tea = create_product(&app, "Tea", "4.25").await;
    app.data(&json!({
        "operation": "createOrder",
        "arguments": {"userId": customer, "products": [tea]}
    }))
    .await;

    app.data(&json!({"operation": "deleteCustomer", "arguments": {"email": "ana@example.com"}}))
        .await;

    let orders = app.data(&json!({"operation": "allOrders"})).await;
    assert!(orders.as_array().unwrap().is_empty());
    let products = app.data(&json!({"operation": "allProducts"})).await;
    assert_eq!(products.as_array().unwrap().len(), 1);
}
