//! The operation surface: queries, mutations and their wire types.
//!
//! A request names one operation and carries its arguments:
//!
//! ```json
//! {"operation": "createOrder", "arguments": {"userId": 1, "products": [3, 3, 7]}}
//! ```
//!
//! [`Operation::execute`] runs it against a [`Store`] and returns the JSON
//! result.

pub mod envelope;
pub mod error;
pub mod mutation;
pub mod query;
pub mod types;

pub use envelope::{CustomerPayload, Envelope, OrderPayload, ProductPayload};
pub use error::OperationError;
pub use mutation::{
    CreateCustomerInput, CreateOrderInput, CreateProductInput, DeleteCustomerInput, Mutation,
    UpdateCustomerInput,
};
pub use query::Query;
pub use types::{CustomerView, OrderItemView, OrderView, ProductView};

use serde::Deserialize;
use serde_json::Value;

use emporium_core::{OrderId, ProductId};

use crate::db::Store;

/// A single request to the API.
#[derive(Debug, Deserialize)]
#[serde(tag = "operation", content = "arguments", rename_all = "camelCase")]
pub enum Operation {
    AllCustomers,
    AllProducts,
    AllOrders,
    CustomerByEmail { email: String },
    ProductById { id: ProductId },
    OrderById { id: OrderId },
    CreateCustomer(CreateCustomerInput),
    UpdateCustomer(UpdateCustomerInput),
    DeleteCustomer(DeleteCustomerInput),
    CreateProduct(CreateProductInput),
    CreateOrder(CreateOrderInput),
}

impl Operation {
    /// The wire name of this operation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AllCustomers => "allCustomers",
            Self::AllProducts => "allProducts",
            Self::AllOrders => "allOrders",
            Self::CustomerByEmail { .. } => "customerByEmail",
            Self::ProductById { .. } => "productById",
            Self::OrderById { .. } => "orderById",
            Self::CreateCustomer(_) => "createCustomer",
            Self::UpdateCustomer(_) => "updateCustomer",
            Self::DeleteCustomer(_) => "deleteCustomer",
            Self::CreateProduct(_) => "createProduct",
            Self::CreateOrder(_) => "createOrder",
        }
    }

    /// Whether this operation may change stored state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateCustomer(_)
                | Self::UpdateCustomer(_)
                | Self::DeleteCustomer(_)
                | Self::CreateProduct(_)
                | Self::CreateOrder(_)
        )
    }

    /// Run the operation.
    ///
    /// # Errors
    ///
    /// Returns whatever [`OperationError`] the resolver produced.
    pub async fn execute(self, store: &dyn Store) -> Result<Value, OperationError> {
        let query = Query::new(store);
        let mutation = Mutation::new(store);

        let value = match self {
            Self::AllCustomers => serde_json::to_value(query.all_customers().await?)?,
            Self::AllProducts => serde_json::to_value(query.all_products().await?)?,
            Self::AllOrders => serde_json::to_value(query.all_orders().await?)?,
            Self::CustomerByEmail { email } => {
                serde_json::to_value(query.customer_by_email(&email).await?)?
            }
            Self::ProductById { id } => serde_json::to_value(query.product_by_id(id).await?)?,
            Self::OrderById { id } => serde_json::to_value(query.order_by_id(id).await?)?,
            Self::CreateCustomer(input) => {
                serde_json::to_value(mutation.create_customer(input).await?)?
            }
            Self::UpdateCustomer(input) => {
                serde_json::to_value(mutation.update_customer(input).await?)?
            }
            Self::DeleteCustomer(input) => {
                serde_json::to_value(mutation.delete_customer(input).await?)?
            }
            Self::CreateProduct(input) => {
                serde_json::to_value(mutation.create_product(input).await?)?
            }
            Self::CreateOrder(input) => serde_json::to_value(mutation.create_order(input).await?)?,
        };
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryStore;

    fn parse(value: Value) -> Operation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_unit_operation() {
        let op = parse(json!({"operation": "allProducts"}));
        assert_eq!(op.name(), "allProducts");
        assert!(!op.is_mutation());
    }

    #[test]
    fn test_parse_accepts_string_ids() {
        let op = parse(json!({"operation": "productById", "arguments": {"id": "7"}}));
        assert!(matches!(op, Operation::ProductById { id } if id == ProductId::new(7)));
    }

    #[test]
    fn test_parse_product_ids_alias() {
        let op = parse(json!({
            "operation": "createOrder",
            "arguments": {"userId": 1, "productIds": [2, "3"]}
        }));
        let Operation::CreateOrder(input) = op else {
            panic!("expected createOrder");
        };
        assert_eq!(input.products, vec![ProductId::new(2), ProductId::new(3)]);
    }

    #[test]
    fn test_parse_update_distinguishes_null_from_absent() {
        let op = parse(json!({
            "operation": "updateCustomer",
            "arguments": {"email": "ana@example.com", "phone": null}
        }));
        let Operation::UpdateCustomer(input) = op else {
            panic!("expected updateCustomer");
        };
        assert!(!input.username.is_set());
        assert!(matches!(input.phone, emporium_core::Patch::Set(None)));
    }

    #[test]
    fn test_parse_rejects_unknown_operation() {
        let result: Result<Operation, _> =
            serde_json::from_value(json!({"operation": "dropTables"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_negative_price() {
        let result: Result<Operation, _> = serde_json::from_value(json!({
            "operation": "createProduct",
            "arguments": {"name": "Mug", "price": "-1.00", "stock": 1}
        }));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_execute_round_trip() {
        let store = MemoryStore::new();

        let created = parse(json!({
            "operation": "createProduct",
            "arguments": {"name": "Mug", "price": "12.5", "stock": 4}
        }))
        .execute(&store)
        .await
        .unwrap();
        assert_eq!(created["success"], true);
        assert_eq!(created["product"]["price"], "12.50");

        let listed = parse(json!({"operation": "allProducts"}))
            .execute(&store)
            .await
            .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let missing = parse(json!({
            "operation": "customerByEmail",
            "arguments": {"email": "nobody@example.com"}
        }))
        .execute(&store)
        .await
        .unwrap();
        assert!(missing.is_null());
    }
}
