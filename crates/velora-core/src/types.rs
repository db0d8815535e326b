//! # Domain Types
//!
//! Core domain types for the Velora storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  status         │   │  order_id (FK)  │       │
//! │  │  price_cents    │   │  total_cents    │   │  quantity       │       │
//! │  │  stock          │   │  customer_*     │   │  price_at_...   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │                      OrderStatus                            │       │
//! │  │                                                             │       │
//! │  │   pending ──► processing ──► shipped ──► delivered (✓)      │       │
//! │  │      │             │            │                           │       │
//! │  │      └─────────────┴────────────┴──────► cancelled (✓)      │       │
//! │  │                                                             │       │
//! │  │   (✓) = terminal: no transition leaves these states         │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `OrderItem.price_at_purchase_cents` freezes the product's price at the
//! instant the order is created. Later catalog price edits never change a
//! historical order total.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product available for sale.
///
/// Serializes with camelCase field names, matching the JSON surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the catalog.
    pub name: String,

    /// Optional long description.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Optional catalog category used for filtering.
    pub category: Option<String>,

    /// Current stock level. Never negative; decremented only by the
    /// inventory ledger's reserve operation.
    pub stock: i64,

    /// Optional image path served by the static file layer.
    pub image: Option<String>,

    /// Size labels offered for this product, e.g. `["S", "M", "L"]`.
    /// Empty when the product is not sized.
    pub sizes: Vec<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the requested quantity could be sold at this
    /// snapshot of stock. Advisory only: the authoritative check is the
    /// ledger's conditional write.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of an order.
///
/// ## State Machine
/// `pending` is the sole initial state. The fulfilment chain is
/// `pending → processing → shipped → delivered`; any non-terminal order
/// may instead move to `cancelled`. `delivered` and `cancelled` are
/// terminal: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order accepted, awaiting processing. Initial state.
    Pending,
    /// Order is being prepared.
    Processing,
    /// Order handed to the carrier.
    Shipped,
    /// Order received by the customer. Terminal.
    Delivered,
    /// Order cancelled before delivery. Terminal.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl OrderStatus {
    /// The wire representation, matching the database TEXT column.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is permitted from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// ## Rules
    /// - The fulfilment chain advances one step at a time
    /// - Any non-terminal state may move to `Cancelled`
    /// - Nothing leaves a terminal state, and no self-transitions
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Processing) => true,
            (Processing, Shipped) => true,
            (Shipped, Delivered) => true,
            (Pending | Processing | Shipped, Cancelled) => true,
            _ => false,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed cash-on-delivery order.
///
/// Created atomically with its line items; after creation only the
/// `status` field is ever mutated, and orders are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    /// Sum of line subtotals, in cents. Immutable after creation.
    pub total_cents: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern to freeze the unit price at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Back-reference to the catalog product. `None` once the product has
    /// been deleted from the catalog; the snapshot fields stand alone.
    pub product_id: Option<String>,
    /// Quantity sold. Always >= 1.
    pub quantity: i64,
    /// Unit price in cents at time of purchase (frozen).
    pub price_at_purchase_cents: i64,
    /// Selected size label, when the product is sized.
    pub size: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn price_at_purchase(&self) -> Money {
        Money::from_cents(self.price_at_purchase_cents)
    }

    /// Line subtotal: unit price × quantity.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.price_at_purchase() * self.quantity
    }
}

// =============================================================================
// Order With Items
// =============================================================================

/// An order together with its line items, as read back from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// New Order Input
// =============================================================================

/// A customer's submitted cart, validated before any storage call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub items: Vec<NewOrderLine>,
}

/// One requested line: which product, how many, which size.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub size: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_status_string_roundtrip() {
        for s in ["pending", "processing", "shipped", "delivered", "cancelled"] {
            let status: OrderStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!("voided".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_fulfilment_chain() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));

        // No skipping steps
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Processing.can_transition_to(Delivered));
    }

    #[test]
    fn test_cancellation_from_non_terminal_states() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        use OrderStatus::*;
        for terminal in [Delivered, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Pending, Processing, Shipped, Delivered, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_no_self_transitions() {
        use OrderStatus::*;
        for s in [Pending, Processing, Shipped, Delivered, Cancelled] {
            assert!(!s.can_transition_to(s));
        }
    }

    #[test]
    fn test_item_subtotal() {
        let item = OrderItem {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            product_id: Some("p1".to_string()),
            quantity: 2,
            price_at_purchase_cents: 5000,
            size: None,
            created_at: Utc::now(),
        };
        assert_eq!(item.subtotal().cents(), 10_000);
    }

    #[test]
    fn test_can_sell_snapshot() {
        let product = Product {
            id: "p1".to_string(),
            name: "Tee".to_string(),
            description: None,
            price_cents: 1999,
            category: None,
            stock: 3,
            image: None,
            sizes: vec!["S".to_string(), "M".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));
    }
}
