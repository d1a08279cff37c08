//! Read-only operations.

use std::collections::HashMap;

use tracing::instrument;

use emporium_core::{Email, OrderId, ProductId};

use super::error::OperationError;
use super::types::{CustomerView, OrderView, ProductView};
use crate::db::{RepositoryError, Store};
use crate::models::{Customer, Order};

/// Query resolvers over a [`Store`].
pub struct Query<'a> {
    store: &'a dyn Store,
}

impl<'a> Query<'a> {
    /// Create resolvers backed by `store`.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Every customer.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn all_customers(&self) -> Result<Vec<CustomerView>, OperationError> {
        let customers = self.store.list_customers().await?;
        Ok(customers.iter().map(CustomerView::from).collect())
    }

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Vec<ProductView>, OperationError> {
        let products = self.store.list_products().await?;
        Ok(products.iter().map(ProductView::from).collect())
    }

    /// Every order, with owner and products resolved.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<OrderView>, OperationError> {
        let orders = self.store.list_orders().await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in &orders {
            views.push(resolve_order(self.store, order).await?);
        }
        Ok(views)
    }

    /// The customer with this email, or `None`.
    ///
    /// A malformed email cannot match anyone and also yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CustomerView>, OperationError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };
        let customer = self.store.customer_by_email(&email).await?;
        Ok(customer.as_ref().map(CustomerView::from))
    }

    /// The product with this id.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::NotFound` if no product has this id.
    /// Returns `OperationError::Repository` if the store fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn product_by_id(&self, id: ProductId) -> Result<ProductView, OperationError> {
        self.store
            .product_by_id(id)
            .await?
            .as_ref()
            .map(ProductView::from)
            .ok_or_else(|| OperationError::not_found("product", id.as_i32()))
    }

    /// The order with this id.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::NotFound` if no order has this id.
    /// Returns `OperationError::Repository` if the store fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn order_by_id(&self, id: OrderId) -> Result<OrderView, OperationError> {
        let order = self
            .store
            .order_by_id(id)
            .await?
            .ok_or_else(|| OperationError::not_found("order", id.as_i32()))?;
        resolve_order(self.store, &order).await
    }
}

/// Load the owner, items and products of an order.
async fn resolve_order(store: &dyn Store, order: &Order) -> Result<OrderView, OperationError> {
    let owner: Customer = store
        .customer_by_id(order.customer_id)
        .await?
        .ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "order {} belongs to missing customer {}",
                order.id, order.customer_id
            ))
        })?;

    let items = store.order_items(order.id).await?;
    let product_ids: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
    let products: HashMap<_, _> = store
        .products_by_ids(&product_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(OrderView::assemble(order, &owner, &items, &products)?)
}
