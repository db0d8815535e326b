//! # Validation Module
//!
//! Input validation for the Velora storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (axum extractors)                                       │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  └── Runs BEFORE any storage call; a rejected order has caused         │
//! │      zero mutations                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── The ledger's conditional stock write                              │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::NewOrder;
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES, MAX_PRICE_CENTS, PHONE_MAX_LEN, PHONE_MIN_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field (customer name, shipping address).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` characters
fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a customer phone number.
///
/// ## Rules
/// Whitespace is stripped first; the remainder must be 9-15 characters
/// drawn from digits, `+`, `-`, `(`, `)`.
///
/// ## Example
/// ```rust
/// use velora_core::validation::validate_phone;
///
/// assert!(validate_phone("+1 (555) 123-4567").is_ok()); // 15 chars stripped
/// assert!(validate_phone("123").is_err());              // too short
/// assert!(validate_phone("call-me-maybe").is_err());    // bad charset
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let stripped: String = phone.chars().filter(|c| !c.is_whitespace()).collect();

    if stripped.is_empty() {
        return Err(ValidationError::Required {
            field: "customerPhone".to_string(),
        });
    }

    if stripped.len() < PHONE_MIN_LEN || stripped.len() > PHONE_MAX_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "customerPhone".to_string(),
            reason: format!(
                "must be {}-{} characters excluding spaces",
                PHONE_MIN_LEN, PHONE_MAX_LEN
            ),
        });
    }

    if !stripped
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "customerPhone".to_string(),
            reason: "must contain only digits, spaces, +, -, ( and )".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, 200)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (zero allowed for promotional items)
/// - Must not exceed MAX_PRICE_CENTS ($1,000,000.00)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 || cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Order Validation
// =============================================================================

/// Validates a submitted cart before any storage call.
///
/// ## What Is Checked
/// - Customer name, phone, shipping address present
/// - Phone format (9-15 chars of digits and `+ - ( )` after stripping)
/// - At least one item, at most MAX_ORDER_LINES
/// - Every line has a product id and a quantity in 1..=999
///
/// ## What Is NOT Checked Here
/// Product existence and stock availability are storage facts; they are
/// checked inside the order-placement transaction.
pub fn validate_new_order(order: &NewOrder) -> ValidationResult<()> {
    validate_required_text("customerName", &order.customer_name, 200)?;
    validate_phone(&order.customer_phone)?;
    validate_required_text("shippingAddress", &order.shipping_address, 1000)?;

    if order.items.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    if order.items.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    for line in &order.items {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "productId".to_string(),
            });
        }
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
