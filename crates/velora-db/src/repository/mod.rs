//! # Repository Implementations
//!
//! One repository per aggregate, each owning its SQL:
//!
//! - [`product`] - Catalog CRUD
//! - [`inventory`] - The inventory ledger (atomic stock reservation)
//! - [`order`] - Order placement, status transitions, reads
//! - [`user`] - Admin user accounts

pub mod inventory;
pub mod order;
pub mod product;
pub mod user;
