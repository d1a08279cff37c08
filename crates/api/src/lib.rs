//! Emporium API library.
//!
//! Customers, products and orders behind a single operation endpoint. The
//! binary in `main.rs` wires configuration, logging and a [`db::Store`]
//! into [`routes::router`]; everything else lives here so it can be tested
//! and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod state;
