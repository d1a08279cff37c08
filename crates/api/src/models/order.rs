//! Orders and their line items.

use chrono::{DateTime, Utc};

use emporium_core::{CustomerId, OrderId, OrderItemId, OrderStatus, Price, ProductId};

use super::Product;

/// An order placed by a customer.
///
/// `total_price` is fixed when the order is created and is not recomputed if
/// its items change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub total_price: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One product line within an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// An order ready to be inserted together with its items.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub total_price: Price,
    pub status: OrderStatus,
    /// `(product, quantity)` pairs, one item row each, in order.
    pub items: Vec<(ProductId, u32)>,
}

impl NewOrder {
    /// Quantity recorded for every item of a newly placed order.
    pub const DEFAULT_QUANTITY: u32 = 1;

    /// Build a pending order with one unit per product.
    ///
    /// The total is the plain sum of the product prices, one per entry, so a
    /// product listed twice is charged twice and gets two item rows.
    #[must_use]
    pub fn from_products(customer_id: CustomerId, products: &[Product]) -> Self {
        Self {
            customer_id,
            total_price: products.iter().map(|p| p.price).sum(),
            status: OrderStatus::default(),
            items: products
                .iter()
                .map(|p| (p.id, Self::DEFAULT_QUANTITY))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product {id}"),
            description: None,
            price: price.parse().unwrap(),
            stock: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_products_sums_prices() {
        let order = NewOrder::from_products(
            CustomerId::new(1),
            &[product(1, "10.00"), product(2, "15.50")],
        );
        assert_eq!(order.total_price.to_string(), "25.50");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(
            order.items,
            vec![(ProductId::new(1), 1), (ProductId::new(2), 1)]
        );
    }

    #[test]
    fn test_from_products_counts_duplicates() {
        let p = product(7, "4.25");
        let order = NewOrder::from_products(CustomerId::new(1), &[p.clone(), p]);
        assert_eq!(order.total_price.to_string(), "8.50");
        assert_eq!(order.items.len(), 2);
    }
}
