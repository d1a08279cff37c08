//! Emporium Core - Shared domain types.
//!
//! This crate provides the value types used across all Emporium components:
//! - `api` - HTTP operation endpoint and storage backends
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, order status and
//!   partial updates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
