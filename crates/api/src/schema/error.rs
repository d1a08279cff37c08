//! Operation error types.

use thiserror::Error;

use emporium_core::EmailError;

use crate::db::RepositoryError;
use crate::services::AuthError;

/// Errors that end a query or mutation.
///
/// A customer missing by email is not one of these: email-keyed operations
/// answer with `null` or an unsuccessful envelope instead.
#[derive(Debug, Error)]
pub enum OperationError {
    /// An id-keyed lookup matched nothing.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name, e.g. `"product"`.
        entity: &'static str,
        /// The id that was looked up.
        id: i32,
    },

    /// None of the product ids given to `createOrder` exist.
    #[error("products not found")]
    ProductsNotFound,

    /// Malformed email on signup.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// An argument exceeded a column limit.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Credential could not be prepared.
    #[error("credential error: {0}")]
    Auth(#[from] AuthError),

    /// Store failure, including constraint violations.
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Result could not be encoded as JSON.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl OperationError {
    pub(crate) const fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}
