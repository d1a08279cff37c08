//! Integration tests for Emporium.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no services needed)
//! cargo test -p emporium-integration-tests
//!
//! # PostgreSQL tests (needs a disposable database)
//! DATABASE_URL=postgres://localhost/emporium_test \
//!     cargo test -p emporium-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `api_operations` - full HTTP round trips against the in-memory store
//! - `postgres_store` - the `PostgreSQL` store against a real database

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};
use tower::ServiceExt;

use emporium_api::db::{self, MemoryStore, PgStore, Store};
use emporium_api::routes;
use emporium_api::state::AppState;

/// A router plus helpers for calling it in-process.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// An app backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// An app backed by `store`.
    #[must_use]
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self {
            router: routes::router(AppState::new(store)),
        }
    }

    /// Post a raw body to `/api`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be served or the response is not JSON.
    pub async fn post_raw(&self, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("Failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).expect("Response is not JSON");
        (status, body)
    }

    /// Post an operation request to `/api`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be served or the response is not JSON.
    pub async fn call(&self, request: &Value) -> (StatusCode, Value) {
        self.post_raw(request.to_string()).await
    }

    /// Post an operation that must succeed and return its `data`.
    ///
    /// # Panics
    ///
    /// Panics if the response status is not 200.
    pub async fn data(&self, request: &Value) -> Value {
        let (status, mut body) = self.call(request).await;
        assert_eq!(status, StatusCode::OK, "unexpected response: {body}");
        body["data"].take()
    }

    /// Issue a GET and return the status.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be served.
    pub async fn get_status(&self, uri: &str) -> StatusCode {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed")
            .status()
    }
}

/// Held by whichever test currently owns the shared database.
static DATABASE_LOCK: Mutex<()> = Mutex::const_new(());

/// Connect to `DATABASE_URL`, apply migrations and empty every table.
///
/// The tests share one database and truncate it, so they must not overlap.
/// Keep the returned guard alive for the whole test.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is unset or the database is unusable.
pub async fn postgres_store() -> (MutexGuard<'static, ()>, PgStore) {
    let guard = DATABASE_LOCK.lock().await;

    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("../api/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    reset(&pool).await;
    (guard, PgStore::new(pool))
}

async fn reset(pool: &PgPool) {
    sqlx::query("TRUNCATE order_items, orders, products, customers RESTART IDENTITY CASCADE")
        .execute(pool)
        .await
        .expect("Failed to truncate tables");
}
