//! Customer accounts.

use chrono::{DateTime, Utc};

use emporium_core::{CustomerId, Email, Patch};

/// A registered customer.
///
/// The email is the login identity and is unique across customers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub email: Email,
    /// Display name.
    pub username: String,
    pub phone: Option<String>,
    /// Argon2id PHC string. Never leaves the process.
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Fields required to insert a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: Email,
    pub username: String,
    pub phone: Option<String>,
    pub password_hash: String,
}

/// A partial update to a customer's profile.
#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    pub username: Patch<String>,
    pub phone: Patch<Option<String>>,
}

impl CustomerChanges {
    /// Whether any field would be overwritten.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.username.is_set() && !self.phone.is_set()
    }
}

impl Customer {
    /// Apply a partial update in place, returning whether anything changed.
    pub fn apply(&mut self, changes: CustomerChanges) -> bool {
        let renamed = changes.username.apply_to(&mut self.username);
        let rephoned = changes.phone.apply_to(&mut self.phone);
        renamed || rephoned
    }
}
