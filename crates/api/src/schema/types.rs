//! Wire representations of the entities.
//!
//! Each view is an allow-list: customers never expose their password hash,
//! and order items refer to their order and product by id.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use emporium_core::{
    CustomerId, Email, OrderId, OrderItemId, OrderStatus, Price, ProductId,
};

use crate::db::RepositoryError;
use crate::models::{Customer, Order, OrderItem, Product};

/// A customer as seen by API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    pub id: CustomerId,
    pub email: Email,
    pub username: String,
    pub phone: Option<String>,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            email: customer.email.clone(),
            username: customer.username.clone(),
            phone: customer.phone.clone(),
        }
    }
}

/// A product as seen by API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub id: OrderItemId,
    pub order: OrderId,
    pub product: ProductId,
    pub quantity: u32,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id,
            order: item.order_id,
            product: item.product_id,
            quantity: item.quantity,
        }
    }
}

/// An order with its owner and products resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub user: CustomerView,
    /// One entry per item, in item order; a product ordered twice appears twice.
    pub products: Vec<ProductView>,
    pub items: Vec<OrderItemView>,
    pub total_price: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderView {
    /// Assemble the view from an order, its owner, its items and a lookup of
    /// the products those items reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if an item references a
    /// product missing from `products`.
    pub fn assemble(
        order: &Order,
        owner: &Customer,
        items: &[OrderItem],
        products: &HashMap<ProductId, Product>,
    ) -> Result<Self, RepositoryError> {
        let product_views = items
            .iter()
            .map(|item| {
                products
                    .get(&item.product_id)
                    .map(ProductView::from)
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "order {} item {} references missing product {}",
                            order.id, item.id, item.product_id
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: order.id,
            user: CustomerView::from(owner),
            products: product_views,
            items: items.iter().map(OrderItemView::from).collect(),
            total_price: order.total_price,
            status: order.status,
            created_at: order.created_at,
        })
    }
}
