//! Customer repository for `PostgreSQL`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use emporium_core::{CustomerId, Email, Patch};

use super::{RepositoryError, map_write_error};
use crate::models::{Customer, CustomerChanges, NewCustomer};

const CUSTOMER_COLUMNS: &str = "id, email, username, phone, password_hash, date_joined";

/// Row shape of the `customers` table.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    email: Email,
    username: String,
    phone: Option<String>,
    password_hash: String,
    date_joined: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            phone: row.phone,
            password_hash: row.password_hash,
            date_joined: row.date_joined,
        }
    }
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    /// Get a customer by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Get a customer by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Create a new customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r"
            INSERT INTO customers (email, username, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(&customer.email)
        .bind(&customer.username)
        .bind(customer.phone.as_deref())
        .bind(&customer.password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "customer"))?;

        Ok(row.into())
    }

    /// Overwrite the supplied profile fields of a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CustomerId,
        changes: CustomerChanges,
    ) -> Result<Customer, RepositoryError> {
        let (set_username, username) = split_patch(changes.username);
        let (set_phone, phone) = split_patch(changes.phone);

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r"
            UPDATE customers
            SET username = CASE WHEN $2 THEN $3 ELSE username END,
                phone = CASE WHEN $4 THEN $5 ELSE phone END
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(set_username)
        .bind(username)
        .bind(set_phone)
        .bind(phone.flatten())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "customer"))?;

        row.map(Customer::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a customer. Orders and order items go with them via `ON DELETE CASCADE`.
    ///
    /// # Returns
    ///
    /// Returns `true` if the customer was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Split a patch into a "should write" flag and the value to bind.
fn split_patch<T>(patch: Patch<T>) -> (bool, Option<T>) {
    match patch {
        Patch::Keep => (false, None),
        Patch::Set(value) => (true, Some(value)),
    }
}
