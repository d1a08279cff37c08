//! Persistence for customers, products, orders and order items.
//!
//! # Backends
//!
//! Operations talk to a [`Store`]. Two implementations exist:
//!
//! - [`PgStore`] - `PostgreSQL` through `sqlx`, the production backend
//! - [`MemoryStore`] - in-process tables with the same constraint and cascade
//!   behaviour, for tests and local runs without a database
//!
//! ## Tables
//!
//! - `customers` - accounts, unique on `email`
//! - `products` - catalog with price and stock
//! - `orders` - owned by a customer (`ON DELETE CASCADE`)
//! - `order_items` - join rows between orders and products (cascade on both)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p emporium-cli -- migrate
//! ```

pub mod customers;
pub mod memory;
pub mod orders;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use emporium_core::{CustomerId, Email, OrderId, ProductId};

use crate::models::{
    Customer, CustomerChanges, NewCustomer, NewOrder, NewProduct, Order, OrderItem, Product,
};

pub use customers::CustomerRepository;
pub use memory::MemoryStore;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (duplicate email, dangling foreign key, failed check).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage operations needed by the query and mutation layers.
///
/// Lookups return `Ok(None)` for a missing row; deciding whether that is an
/// error is left to the caller.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// All customers, ascending by id.
    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError>;

    async fn customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    async fn customer_by_email(&self, email: &Email)
    -> Result<Option<Customer>, RepositoryError>;

    /// Insert a customer.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, RepositoryError>;

    /// Overwrite the fields set in `changes`.
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    async fn update_customer(
        &self,
        id: CustomerId,
        changes: CustomerChanges,
    ) -> Result<Customer, RepositoryError>;

    /// Delete a customer together with their orders and order items.
    ///
    /// Returns `false` if there was nothing to delete.
    async fn delete_customer(&self, id: CustomerId) -> Result<bool, RepositoryError>;

    /// All products, ascending by id.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// The distinct products whose id appears in `ids`, ascending by id.
    ///
    /// Unknown ids are skipped.
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// All orders, ascending by id.
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Items of an order, ascending by id.
    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError>;

    /// Insert an order and all of its items atomically.
    ///
    /// Returns `RepositoryError::Conflict` if the customer or any product does
    /// not exist; nothing is written in that case.
    async fn insert_order(&self, order: NewOrder)
    -> Result<(Order, Vec<OrderItem>), RepositoryError>;
}

/// `PostgreSQL`-backed [`Store`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        CustomerRepository::new(&self.pool).list().await
    }

    async fn customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        CustomerRepository::new(&self.pool).get_by_id(id).await
    }

    async fn customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Customer>, RepositoryError> {
        CustomerRepository::new(&self.pool).get_by_email(email).await
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        CustomerRepository::new(&self.pool).create(&customer).await
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        changes: CustomerChanges,
    ) -> Result<Customer, RepositoryError> {
        CustomerRepository::new(&self.pool)
            .update(id, changes)
            .await
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        CustomerRepository::new(&self.pool).delete(id).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).list().await
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get_by_id(id).await
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get_many(ids).await
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        ProductRepository::new(&self.pool).create(&product).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).list().await
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).get_by_id(id).await
    }

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        OrderRepository::new(&self.pool).items(order_id).await
    }

    async fn insert_order(
        &self,
        order: NewOrder,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        OrderRepository::new(&self.pool).create(&order).await
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Translate constraint violations on writes into `RepositoryError::Conflict`.
pub(crate) fn map_write_error(e: sqlx::Error, entity: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{entity} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(format!("{entity} references a missing row"));
        }
        if db_err.is_check_violation() {
            return RepositoryError::Conflict(format!("{entity} violates a check constraint"));
        }
    }
    RepositoryError::Database(e)
}

/// Convert a non-negative database integer into `u32`.
pub(crate) fn non_negative(value: i32, column: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative {column}: {value}")))
}

/// Convert a count into a database integer.
pub(crate) fn to_db_int(value: u32, column: &str) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::Conflict(format!("{column} out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(4, "stock").ok(), Some(4));
        assert!(matches!(
            non_negative(-1, "stock"),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_to_db_int_range() {
        assert_eq!(to_db_int(1, "quantity").ok(), Some(1));
        assert!(matches!(
            to_db_int(u32::MAX, "quantity"),
            Err(RepositoryError::Conflict(_))
        ));
    }
}
