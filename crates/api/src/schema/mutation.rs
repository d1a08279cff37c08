//! State-changing operations.
//!
//! Every mutation answers with an [`Envelope`]. Customer mutations keyed by
//! email report a missing customer as `success: false` rather than an error.

use std::collections::HashMap;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{CustomerId, Email, Patch, Price, ProductId};

use super::envelope::{CustomerPayload, Envelope, OrderPayload, ProductPayload};
use super::error::OperationError;
use super::types::{CustomerView, OrderView, ProductView};
use crate::db::Store;
use crate::models::{CustomerChanges, NewCustomer, NewOrder, NewProduct, Product};
use crate::services::Credential;

const MAX_USERNAME_LENGTH: usize = 150;
const MAX_PHONE_LENGTH: usize = 20;
const MAX_PRODUCT_NAME_LENGTH: usize = 255;
/// Stock is stored as a signed 32-bit column.
const MAX_STOCK: u32 = i32::MAX.unsigned_abs();

/// Arguments of `createCustomer`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerInput {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Chosen password. A random one is generated when absent.
    #[serde(default)]
    pub password: Option<SecretString>,
}

/// Arguments of `updateCustomer`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerInput {
    /// Lookup key; never changed by the update.
    pub email: String,
    #[serde(default)]
    pub username: Patch<String>,
    /// `null` clears the phone number.
    #[serde(default)]
    pub phone: Patch<Option<String>>,
}

/// Arguments of `deleteCustomer`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCustomerInput {
    pub email: String,
}

/// Arguments of `createProduct`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
}

impl CreateProductInput {
    /// Check field limits without touching a store.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidArgument` naming the first field out
    /// of range.
    pub fn validate(&self) -> Result<(), OperationError> {
        check_length("name", &self.name, MAX_PRODUCT_NAME_LENGTH)?;
        if self.stock > MAX_STOCK {
            return Err(OperationError::InvalidArgument(format!(
                "stock must be at most {MAX_STOCK}"
            )));
        }
        Ok(())
    }
}

/// Arguments of `createOrder`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    pub user_id: CustomerId,
    /// Product ids, one unit each. Unknown ids are dropped; repeats are kept.
    #[serde(alias = "productIds")]
    pub products: Vec<ProductId>,
}

/// Mutation resolvers over a [`Store`].
pub struct Mutation<'a> {
    store: &'a dyn Store,
}

impl<'a> Mutation<'a> {
    /// Create resolvers backed by `store`.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Sign up a customer.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidEmail` or `OperationError::InvalidArgument`
    /// for malformed input, `OperationError::Auth` for a weak password, and
    /// `OperationError::Repository` wrapping `RepositoryError::Conflict` if the
    /// email is taken.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<Envelope<CustomerPayload>, OperationError> {
        let email = Email::parse(&input.email)?;
        check_length("username", &input.username, MAX_USERNAME_LENGTH)?;
        if let Some(phone) = &input.phone {
            check_length("phone", phone, MAX_PHONE_LENGTH)?;
        }

        let credential = Credential::new(input.password.as_ref())?;
        let generated_password = credential.generated;
        let customer = self
            .store
            .insert_customer(NewCustomer {
                email,
                username: input.username,
                phone: input.phone,
                password_hash: credential.into_hash(),
            })
            .await?;

        tracing::info!(customer_id = %customer.id, "Customer created");
        if generated_password {
            tracing::warn!(
                customer_id = %customer.id,
                "Customer was given a random password and must reset it before logging in"
            );
        }

        Ok(Envelope::succeeded(
            format!("Customer with email {} created successfully", customer.email),
            CustomerPayload {
                customer: Some(CustomerView::from(&customer)),
            },
        ))
    }

    /// Overwrite the supplied fields of the customer with this email.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidArgument` if a field exceeds its limit,
    /// or `OperationError::Repository` if the store fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn update_customer(
        &self,
        input: UpdateCustomerInput,
    ) -> Result<Envelope<CustomerPayload>, OperationError> {
        let Some(existing) = self.find_by_email(&input.email).await? else {
            return Ok(not_found(&input.email));
        };

        if let Patch::Set(username) = &input.username {
            check_length("username", username, MAX_USERNAME_LENGTH)?;
        }
        if let Patch::Set(Some(phone)) = &input.phone {
            check_length("phone", phone, MAX_PHONE_LENGTH)?;
        }

        let changes = CustomerChanges {
            username: input.username,
            phone: input.phone,
        };
        let customer = if changes.is_empty() {
            existing
        } else {
            let customer = self.store.update_customer(existing.id, changes).await?;
            tracing::info!(customer_id = %customer.id, "Customer updated");
            customer
        };

        Ok(Envelope::succeeded(
            format!("Customer with email {} updated successfully", customer.email),
            CustomerPayload {
                customer: Some(CustomerView::from(&customer)),
            },
        ))
    }

    /// Delete the customer with this email, along with their orders.
    ///
    /// A successful envelope carries the customer as it was before deletion.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Repository` if the store fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn delete_customer(
        &self,
        input: DeleteCustomerInput,
    ) -> Result<Envelope<CustomerPayload>, OperationError> {
        let Some(existing) = self.find_by_email(&input.email).await? else {
            return Ok(not_found(&input.email));
        };

        // Lost a race with another delete: same answer as never having existed.
        if !self.store.delete_customer(existing.id).await? {
            return Ok(not_found(&input.email));
        }

        tracing::info!(customer_id = %existing.id, "Customer deleted");

        Ok(Envelope::succeeded(
            format!("Customer with email {} deleted successfully", input.email),
            CustomerPayload {
                customer: Some(CustomerView::from(&existing)),
            },
        ))
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidArgument` if the name is too long or
    /// the stock does not fit its column, or `OperationError::Repository` if
    /// the store fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<Envelope<ProductPayload>, OperationError> {
        input.validate()?;

        let product = self
            .store
            .insert_product(NewProduct {
                name: input.name,
                description: input.description,
                price: input.price,
                stock: input.stock,
            })
            .await?;

        tracing::info!(product_id = %product.id, price = %product.price, "Product created");

        Ok(Envelope::succeeded(
            format!("Product {} created successfully", product.name),
            ProductPayload {
                product: ProductView::from(&product),
            },
        ))
    }

    /// Place a pending order for one unit of each listed product.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::NotFound` if the customer does not exist,
    /// `OperationError::ProductsNotFound` if none of the product ids exist,
    /// and `OperationError::Repository` if the store fails. No order is
    /// written on any error.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, requested = input.products.len()))]
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
    ) -> Result<Envelope<OrderPayload>, OperationError> {
        let customer = self
            .store
            .customer_by_id(input.user_id)
            .await?
            .ok_or_else(|| OperationError::not_found("customer", input.user_id.as_i32()))?;

        let catalog: HashMap<ProductId, Product> = self
            .store
            .products_by_ids(&input.products)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let resolved: Vec<Product> = input
            .products
            .iter()
            .filter_map(|id| catalog.get(id).cloned())
            .collect();
        if resolved.is_empty() {
            return Err(OperationError::ProductsNotFound);
        }
        if resolved.len() < input.products.len() {
            tracing::debug!(
                dropped = input.products.len() - resolved.len(),
                "Ignoring unknown product ids"
            );
        }

        let new_order = NewOrder::from_products(customer.id, &resolved);
        if new_order.total_price.amount() >= Price::max_exclusive() {
            return Err(OperationError::InvalidArgument(format!(
                "order total must be less than {}",
                Price::max_exclusive()
            )));
        }

        let (order, items) = self.store.insert_order(new_order).await?;

        tracing::info!(
            order_id = %order.id,
            total_price = %order.total_price,
            items = items.len(),
            "Order created"
        );

        let view = OrderView::assemble(&order, &customer, &items, &catalog)?;
        Ok(Envelope::succeeded(
            format!("Order {} created successfully", order.id),
            OrderPayload { order: view },
        ))
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<crate::models::Customer>, OperationError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };
        Ok(self.store.customer_by_email(&email).await?)
    }
}

fn not_found(email: &str) -> Envelope<CustomerPayload> {
    Envelope::failed(
        format!("Customer with email {email} not found"),
        CustomerPayload { customer: None },
    )
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), OperationError> {
    if value.chars().count() > max {
        return Err(OperationError::InvalidArgument(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}
