//! Business services that sit beside the store.

pub mod auth;

pub use auth::{AuthError, Credential};
