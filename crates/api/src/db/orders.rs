//! Order repository for `PostgreSQL`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use emporium_core::{CustomerId, OrderId, OrderItemId, OrderStatus, Price, ProductId};

use super::{RepositoryError, map_write_error, non_negative, to_db_int};
use crate::models::{NewOrder, Order, OrderItem};

const ORDER_COLUMNS: &str = "id, customer_id, total_price, status, created_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: CustomerId,
    total_price: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            total_price: row.total_price,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: non_negative(row.quantity, "quantity")?,
        })
    }
}

/// Repository for order and order item database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Get the items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect()
    }

    /// Create an order and its items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer or a product no
    /// longer exists. The transaction is rolled back and nothing is written.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        order: &NewOrder,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (customer_id, total_price, status)
            VALUES ($1, $2, $3)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.customer_id)
        .bind(order.total_price)
        .bind(order.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "order"))?;

        let created = Order::from(row);

        let mut items = Vec::with_capacity(order.items.len());
        for &(product_id, quantity) in &order.items {
            let item = sqlx::query_as::<_, OrderItemRow>(&format!(
                r"
                INSERT INTO order_items (order_id, product_id, quantity)
                VALUES ($1, $2, $3)
                RETURNING {ITEM_COLUMNS}
                "
            ))
            .bind(created.id)
            .bind(product_id)
            .bind(to_db_int(quantity, "quantity")?)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "order item"))?;

            items.push(OrderItem::try_from(item)?);
        }

        tx.commit().await?;

        Ok((created, items))
    }
}
