//! # Inventory Ledger
//!
//! The single authority for whether a requested quantity of a product can
//! be sold right now, and for committing that sale against stock.
//!
//! ## Admission Control
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Why One Conditional Write, Not Read-Then-Write             │
//! │                                                                         │
//! │  ❌ WRONG: the classic lost-update race                                │
//! │     SELECT stock FROM products WHERE id = ?        -- both read 5      │
//! │     -- two handlers compare 5 >= 3, both pass                          │
//! │     UPDATE products SET stock = 5 - 3              -- both write 2     │
//! │     -- 6 units sold out of 5                                           │
//! │                                                                         │
//! │  ✅ CORRECT: check and decrement in one statement                      │
//! │     UPDATE products SET stock = stock - 3                              │
//! │     WHERE id = ? AND stock >= 3                                        │
//! │     -- SQLite serializes row writes; the second statement sees         │
//! │     -- stock = 2, matches no row, and the reservation is refused       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Discipline
//! `reserve` runs on the caller's connection, normally inside an
//! order-placement transaction. The decrement becomes durable only when
//! that transaction commits; aborting it reverts every reservation made
//! within it. There is deliberately no standalone "release" operation.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Atomically reserves `quantity` units of a product's stock.
///
/// The stock check and the decrement are a single conditional UPDATE, so
/// two concurrent reservations can never both succeed when their combined
/// quantity exceeds what is available.
///
/// ## Arguments
/// * `conn` - The caller's connection; pass the enclosing transaction so
///   the reservation commits or rolls back with it
/// * `product_id` - Product to reserve against
/// * `quantity` - Units requested; must be >= 1
///
/// ## Returns
/// * `Ok(new_stock)` - Reservation held; stock after the decrement
/// * `Err(DbError::NotFound)` - No such product
/// * `Err(DbError::InsufficientStock)` - Fewer than `quantity` units left
pub async fn reserve(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<i64> {
    // Callers validate quantity up front; a non-positive value reaching
    // this point would turn the decrement into an increment.
    if quantity <= 0 {
        return Err(DbError::Internal(format!(
            "reserve called with non-positive quantity {}",
            quantity
        )));
    }

    let now = Utc::now();

    // Check-and-decrement as one indivisible statement.
    let new_stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET stock = stock - ?1, updated_at = ?2
        WHERE id = ?3 AND stock >= ?1
        RETURNING stock
        "#,
    )
    .bind(quantity)
    .bind(now)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    match new_stock {
        Some(stock) => {
            debug!(product_id = %product_id, quantity = %quantity, stock = %stock, "Stock reserved");
            Ok(stock)
        }
        None => {
            // No row matched: either the product is gone or stock is short.
            // Disambiguate with a read on the same connection (same
            // transaction, so the answer is consistent with the UPDATE).
            let row: Option<(String, i64)> =
                sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1")
                    .bind(product_id)
                    .fetch_optional(&mut *conn)
                    .await?;

            match row {
                None => Err(DbError::not_found("Product", product_id)),
                Some((name, available)) => Err(DbError::InsufficientStock {
                    name,
                    available,
                    requested: quantity,
                }),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use uuid::Uuid;
    use velora_core::Product;

    async fn test_db_with_product(stock: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: "Linen Shirt".to_string(),
            description: None,
            price_cents: 5000,
            category: Some("shirts".to_string()),
            stock,
            image: None,
            sizes: vec![],
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        (db, product.id)
    }

    #[tokio::test]
    async fn test_reserve_decrements_stock() {
        let (db, id) = test_db_with_product(10).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let new_stock = reserve(&mut conn, &id, 3).await.unwrap();
        assert_eq!(new_stock, 7);
        drop(conn);

        let product = db.products().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(product.stock, 7);
    }

    #[tokio::test]
    async fn test_reserve_refuses_over_allocation() {
        let (db, id) = test_db_with_product(2).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let err = reserve(&mut conn, &id, 3).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));
        drop(conn);

        // Refused reservation leaves stock untouched
        let product = db.products().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(product.stock, 2);
    }

    #[tokio::test]
    async fn test_reserve_exact_remaining_stock() {
        let (db, id) = test_db_with_product(4).await;

        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(reserve(&mut conn, &id, 4).await.unwrap(), 0);

        // Nothing left: even a single unit is refused now
        let err = reserve(&mut conn, &id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::InsufficientStock { available: 0, .. }));
    }

    #[tokio::test]
    async fn test_reserve_unknown_product() {
        let (db, _) = test_db_with_product(5).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let err = reserve(&mut conn, "no-such-id", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reserve_rejects_non_positive_quantity() {
        let (db, id) = test_db_with_product(5).await;

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(reserve(&mut conn, &id, 0).await.is_err());
        assert!(reserve(&mut conn, &id, -2).await.is_err());
        drop(conn);

        let product = db.products().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(product.stock, 5);
    }

    #[tokio::test]
    async fn test_rollback_reverts_reservation() {
        let (db, id) = test_db_with_product(5).await;

        {
            let mut tx = db.pool().begin().await.unwrap();
            reserve(&mut tx, &id, 3).await.unwrap();
            // Dropped without commit -> rollback
        }

        let product = db.products().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(product.stock, 5);
    }
}
