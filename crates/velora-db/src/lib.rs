//! # velora-db: Database Layer for the Velora Storefront
//!
//! This crate provides database access for the storefront.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Velora Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (place_order)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     velora-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ product/order │    │  (embedded)  │  │   │
//! │  │   │               │    │ user +        │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ inventory     │    │ 001_init.sql │  │   │
//! │  │   │ Management    │    │ ledger        │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories and the inventory ledger
//!
//! ## Usage
//!
//! ```rust,ignore
//! use velora_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/store.db")).await?;
//! let catalog = db.products().list(None).await?;
//! let placed = db.orders().place_order(&new_order).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::product::{ProductPatch, ProductRepository};
pub use repository::user::{User, UserRepository};
