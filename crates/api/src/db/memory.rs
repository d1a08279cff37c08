//! In-process [`Store`] backed by ordered maps.
//!
//! Mirrors the `PostgreSQL` schema's guarantees: unique customer email,
//! foreign keys checked on insert, cascading deletes, serial ids that are
//! never reused. All tables sit behind one lock so multi-row writes are
//! atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use emporium_core::{CustomerId, Email, OrderId, OrderItemId, ProductId};

use super::{RepositoryError, Store};
use crate::models::{
    Customer, CustomerChanges, NewCustomer, NewOrder, NewProduct, Order, OrderItem, Product,
};

#[derive(Debug, Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    order_items: BTreeMap<OrderItemId, OrderItem>,
    sequences: Sequences,
}

/// Last id handed out per table.
#[derive(Debug, Default)]
struct Sequences {
    customer: i32,
    product: i32,
    order: i32,
    order_item: i32,
}

/// Advance a sequence, failing once it would wrap like a `SERIAL` column.
fn next(seq: &mut i32) -> Result<i32, RepositoryError> {
    *seq = seq
        .checked_add(1)
        .ok_or_else(|| RepositoryError::DataCorruption("id sequence exhausted".to_string()))?;
    Ok(*seq)
}

impl Tables {
    fn remove_items_where(&mut self, pred: impl Fn(&OrderItem) -> bool) {
        self.order_items.retain(|_, item| !pred(item));
    }
}

/// A [`Store`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Delete a product and the order items referencing it.
    pub async fn delete_product(&self, id: ProductId) -> bool {
        let mut tables = self.tables.write().await;
        if tables.products.remove(&id).is_none() {
            return false;
        }
        tables.remove_items_where(|item| item.product_id == id);
        true
    }

    /// Delete an order and its items.
    pub async fn delete_order(&self, id: OrderId) -> bool {
        let mut tables = self.tables.write().await;
        if tables.orders.remove(&id).is_none() {
            return false;
        }
        tables.remove_items_where(|item| item.order_id == id);
        true
    }

    /// Number of order item rows across all orders.
    pub async fn order_item_count(&self) -> usize {
        self.tables.read().await.order_items.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.tables.read().await.customers.values().cloned().collect())
    }

    async fn customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .customers
            .values()
            .find(|c| &c.email == email)
            .cloned())
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.customers.values().any(|c| c.email == customer.email) {
            return Err(RepositoryError::Conflict(
                "customer already exists".to_owned(),
            ));
        }

        let id = CustomerId::new(next(&mut tables.sequences.customer)?);
        let created = Customer {
            id,
            email: customer.email,
            username: customer.username,
            phone: customer.phone,
            password_hash: customer.password_hash,
            date_joined: Utc::now(),
        };
        tables.customers.insert(id, created.clone());
        Ok(created)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        changes: CustomerChanges,
    ) -> Result<Customer, RepositoryError> {
        let mut tables = self.tables.write().await;
        let customer = tables
            .customers
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        customer.apply(changes);
        Ok(customer.clone())
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.customers.remove(&id).is_none() {
            return Ok(false);
        }

        let owned: Vec<OrderId> = tables
            .orders
            .values()
            .filter(|o| o.customer_id == id)
            .map(|o| o.id)
            .collect();
        for order_id in &owned {
            tables.orders.remove(order_id);
        }
        tables.remove_items_where(|item| owned.contains(&item.order_id));
        Ok(true)
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .products
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        if i32::try_from(product.stock).is_err() {
            return Err(RepositoryError::Conflict(format!(
                "stock out of range: {}",
                product.stock
            )));
        }

        let mut tables = self.tables.write().await;
        let id = ProductId::new(next(&mut tables.sequences.product)?);
        let now = Utc::now();
        let created = Product {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(id, created.clone());
        Ok(created)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.tables.read().await.orders.values().cloned().collect())
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .order_items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn insert_order(
        &self,
        order: NewOrder,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut tables = self.tables.write().await;

        // Check every reference before writing anything.
        if !tables.customers.contains_key(&order.customer_id) {
            return Err(RepositoryError::Conflict(
                "order references a missing row".to_owned(),
            ));
        }
        if let Some((missing, _)) = order
            .items
            .iter()
            .find(|(product_id, _)| !tables.products.contains_key(product_id))
        {
            return Err(RepositoryError::Conflict(format!(
                "order item references a missing row (product {missing})"
            )));
        }
        if order.items.iter().any(|&(_, quantity)| quantity == 0) {
            return Err(RepositoryError::Conflict(
                "order item violates a check constraint".to_owned(),
            ));
        }

        // Allocate every id up front so an exhausted sequence writes nothing.
        let id = OrderId::new(next(&mut tables.sequences.order)?);
        let item_ids = order
            .items
            .iter()
            .map(|_| next(&mut tables.sequences.order_item).map(OrderItemId::new))
            .collect::<Result<Vec<_>, _>>()?;

        let created = Order {
            id,
            customer_id: order.customer_id,
            total_price: order.total_price,
            status: order.status,
            created_at: Utc::now(),
        };
        tables.orders.insert(id, created.clone());

        let mut items = Vec::with_capacity(order.items.len());
        for (item_id, (product_id, quantity)) in item_ids.into_iter().zip(order.items) {
            let item = OrderItem {
                id: item_id,
                order_id: id,
                product_id,
                quantity,
            };
            tables.order_items.insert(item_id, item.clone());
            items.push(item);
        }

        Ok((created, items))
    }
}
