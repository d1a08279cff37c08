//! `PostgreSQL` store tests.
//!
//! These tests require a disposable database in `DATABASE_URL`; every test
//! truncates all tables while holding the shared database lock. Run with
//! `cargo test -- --ignored`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use emporium_api::db::{RepositoryError, Store};
use emporium_api::models::{CustomerChanges, NewCustomer, NewOrder, NewProduct};
use emporium_core::{Email, Patch, ProductId};
use emporium_integration_tests::{TestApp, postgres_store};

fn unique_email() -> Email {
    Email::parse(&format!("test-{}@example.com", Uuid::new_v4())).unwrap()
}

fn new_customer(email: Email) -> NewCustomer {
    NewCustomer {
        email,
        username: "pg".to_string(),
        phone: None,
        password_hash: "$argon2id$placeholder".to_string(),
    }
}

fn new_product(price: &str) -> NewProduct {
    NewProduct {
        name: "Widget".to_string(),
        description: Some("Blue".to_string()),
        price: price.parse().unwrap(),
        stock: 3,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_customer_round_trip() {
    let (_db, store) = postgres_store().await;
    let email = unique_email();

    let created = store.insert_customer(new_customer(email.clone())).await.unwrap();
    let found = store.customer_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.id, created.id);

    let err = store.insert_customer(new_customer(email.clone())).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let updated = store
        .update_customer(
            created.id,
            CustomerChanges {
                username: Patch::Set("renamed".to_string()),
                phone: Patch::Set(Some("555-0199".to_string())),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "renamed");
    assert_eq!(updated.phone.as_deref(), Some("555-0199"));

    assert!(store.delete_customer(created.id).await.unwrap());
    assert!(!store.delete_customer(created.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_order_insert_and_cascade() {
    let (_db, store) = postgres_store().await;
    let customer = store.insert_customer(new_customer(unique_email())).await.unwrap();
    let a = store.insert_product(new_product("2.50")).await.unwrap();
    let b = store.insert_product(new_product("0.75")).await.unwrap();

    let (order, items) = store
        .insert_order(NewOrder::from_products(customer.id, &[a.clone(), b, a]))
        .await
        .unwrap();
    assert_eq!(order.total_price.to_string(), "5.75");
    assert_eq!(items.len(), 3);
    assert_eq!(store.order_items(order.id).await.unwrap().len(), 3);

    let found = store
        .products_by_ids(&[ProductId::new(999_999), items[0].product_id])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    store.delete_customer(customer.id).await.unwrap();
    assert!(store.order_by_id(order.id).await.unwrap().is_none());
    assert!(store.order_items(order.id).await.unwrap().is_empty());
    assert_eq!(store.list_products().await.unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_http_against_postgres() {
    let (_db, store) = postgres_store().await;
    let app = TestApp::with_store(Arc::new(store));
    assert_eq!(app.get_status("/health/ready").await, StatusCode::OK);

    let created = app
        .data(&json!({
            "operation": "createProduct",
            "arguments": {"name": "Teapot", "price": "19.90", "stock": 1}
        }))
        .await;
    assert_eq!(created["product"]["price"], "19.90");

    let listed = app.data(&json!({"operation": "allProducts"})).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
