//! # velora-core: Pure Business Logic for the Velora Storefront
//!
//! This crate is the heart of the storefront. It contains all business
//! logic as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Velora Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │    catalog routes ──► order routes ──► admin routes             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ velora-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ validation│  │   error   │  │   │
//! │  │   │  Product  │  │   Money   │  │   rules   │  │  domain   │  │   │
//! │  │   │   Order   │  │  (cents)  │  │  checks   │  │  errors   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    velora-db (Database Layer)                   │   │
//! │  │        SQLite queries, transactions, the inventory ledger       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderItem, OrderStatus)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use velora_core::money::Money;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(5000); // $50.00
//!
//! // A two-unit line item
//! let subtotal = price * 2;
//! assert_eq!(subtotal.cents(), 10_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use velora_core::Money` instead of
// `use velora_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines allowed in a single order.
///
/// ## Business Reason
/// Prevents runaway carts and keeps one order-placement transaction short.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single product in one order line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum product price, in cents ($1,000,000.00).
///
/// ## Business Reason
/// Bounds admin typos, and keeps the worst-case order total
/// (MAX_PRICE_CENTS × MAX_LINE_QUANTITY × MAX_ORDER_LINES) far below
/// the i64 range.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Phone numbers must have at least this many characters after
/// whitespace stripping.
pub const PHONE_MIN_LEN: usize = 9;

/// Phone numbers must have at most this many characters after
/// whitespace stripping.
pub const PHONE_MAX_LEN: usize = 15;
