//! Domain models.
//!
//! These are the validated in-process entities, separate from database row
//! types (in `db`) and wire types (in `schema::types`). None of them derive
//! `Serialize`: what leaves the process is decided by the wire types.

pub mod customer;
pub mod order;
pub mod product;

pub use customer::{Customer, CustomerChanges, NewCustomer};
pub use order::{NewOrder, Order, OrderItem};
pub use product::{NewProduct, Product};
