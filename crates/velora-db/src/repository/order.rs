//! # Order Repository
//!
//! Order placement, status transitions, and order reads.
//!
//! ## Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      place_order (one transaction)                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ▼  for each requested line                                           │
//! │  inventory::reserve ──► missing? ──► ROLLBACK, NotFound                 │
//! │    │                ──► short?   ──► ROLLBACK, InsufficientStock        │
//! │    ▼                                                                    │
//! │  SELECT price_cents (unit-price snapshot for the line item)             │
//! │    │                                                                    │
//! │    ▼  all lines reserved                                                │
//! │  INSERT order header (status = pending, total from reserved prices)     │
//! │  INSERT one order_items row per line (price snapshot)                   │
//! │    │                                                                    │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure before COMMIT drops the transaction, which rolls back every
//! reservation and row written so far. An order is either fully recorded
//! with its stock held, or it never happened.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::inventory;
use velora_core::{Money, NewOrder, Order, OrderDetail, OrderItem, OrderStatus};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, FromRow)]
struct OrderRecord {
    id: String,
    status: OrderStatus,
    total_cents: i64,
    customer_name: String,
    customer_phone: String,
    shipping_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRecord> for Order {
    fn from(r: OrderRecord) -> Self {
        Order {
            id: r.id,
            status: r.status,
            total_cents: r.total_cents,
            customer_name: r.customer_name,
            customer_phone: r.customer_phone,
            shipping_address: r.shipping_address,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderItemRecord {
    id: String,
    order_id: String,
    product_id: Option<String>,
    quantity: i64,
    price_at_purchase_cents: i64,
    size: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OrderItemRecord> for OrderItem {
    fn from(r: OrderItemRecord) -> Self {
        OrderItem {
            id: r.id,
            order_id: r.order_id,
            product_id: r.product_id,
            quantity: r.quantity,
            price_at_purchase_cents: r.price_at_purchase_cents,
            size: r.size,
            created_at: r.created_at,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, status, total_cents, customer_name, customer_phone, shipping_address, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, quantity, price_at_purchase_cents, size, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order: reserves stock for every line, then records the
    /// order header and its line items, all in one transaction.
    ///
    /// The caller is expected to have validated `new_order` already;
    /// this method enforces the storage invariants (stock, existence).
    ///
    /// ## Returns
    /// * `Ok(OrderDetail)` - Order recorded, stock decremented
    /// * `Err(DbError::NotFound)` - A line referenced an unknown product
    /// * `Err(DbError::InsufficientStock)` - A line asked for more than
    ///   is available; nothing was written
    pub async fn place_order(&self, new_order: &NewOrder) -> DbResult<OrderDetail> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Reserve stock line by line, snapshotting the price each line
        // sells at. The first failure aborts the whole order.
        let mut total = Money::zero();
        let mut priced_lines = Vec::with_capacity(new_order.items.len());

        for line in &new_order.items {
            // The reserve UPDATE is the transaction's first statement, so
            // the connection takes SQLite's write lock before any read
            // pins a snapshot. Concurrent placements queue on the busy
            // handler instead of aborting with a stale-snapshot error.
            inventory::reserve(&mut tx, &line.product_id, line.quantity).await?;

            // Row guaranteed present: the reservation above just hit it.
            let price_cents: i64 =
                sqlx::query_scalar("SELECT price_cents FROM products WHERE id = ?1")
                    .bind(&line.product_id)
                    .fetch_one(&mut *tx)
                    .await?;

            total = Money::from_cents(price_cents)
                .checked_mul(line.quantity)
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or_else(|| DbError::Internal("order total overflows".to_string()))?;
            priced_lines.push((line, price_cents));
        }

        let order_id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, status, total_cents, customer_name, customer_phone,
                shipping_address, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order_id)
        .bind(OrderStatus::Pending)
        .bind(total.cents())
        .bind(&new_order.customer_name)
        .bind(&new_order.customer_phone)
        .bind(&new_order.shipping_address)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(priced_lines.len());
        for (line, price_cents) in priced_lines {
            let item = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: Some(line.product_id.clone()),
                quantity: line.quantity,
                price_at_purchase_cents: price_cents,
                size: line.size.clone(),
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, quantity,
                    price_at_purchase_cents, size, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.price_at_purchase_cents)
            .bind(&item.size)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit().await?;

        info!(
            order_id = %order_id,
            lines = items.len(),
            total = %total,
            "Order placed"
        );

        let order = Order {
            id: order_id,
            status: OrderStatus::Pending,
            total_cents: total.cents(),
            customer_name: new_order.customer_name.clone(),
            customer_phone: new_order.customer_phone.clone(),
            shipping_address: new_order.shipping_address.clone(),
            created_at: now,
            updated_at: now,
        };

        Ok(OrderDetail { order, items })
    }

    /// Gets an order with its line items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<OrderDetail>> {
        let record: Option<OrderRecord> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let items: Vec<OrderItemRecord> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY rowid"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order: record.into(),
            items: items.into_iter().map(OrderItem::from).collect(),
        }))
    }

    /// Lists every order with its line items, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<OrderDetail>> {
        let records: Vec<OrderRecord> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let item_records: Vec<OrderItemRecord> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in item_records {
            items_by_order
                .entry(item.order_id.clone())
                .or_default()
                .push(item.into());
        }

        debug!(count = records.len(), "Listed orders");

        Ok(records
            .into_iter()
            .map(|record| {
                let items = items_by_order.remove(&record.id).unwrap_or_default();
                OrderDetail {
                    order: record.into(),
                    items,
                }
            })
            .collect())
    }

    /// Moves an order from one status to another with a guarded write.
    ///
    /// The `from` guard makes the transition atomic: if another update
    /// changed the status after the caller read it, no row matches and
    /// nothing is written.
    ///
    /// ## Returns
    /// * `Ok(true)` - Transition applied
    /// * `Ok(false)` - Order exists but was no longer in `from`
    /// * `Err(DbError::NotFound)` - No such order
    pub async fn set_status(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        )
        .bind(to)
        .bind(Utc::now())
        .bind(order_id)
        .bind(from)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE id = ?1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

            return match exists {
                None => Err(DbError::not_found("Order", order_id)),
                Some(_) => Ok(false),
            };
        }

        info!(order_id = %order_id, from = %from, to = %to, "Order status updated");
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use velora_core::{NewOrderLine, Product};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn insert_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> String {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            price_cents,
            category: None,
            stock,
            image: None,
            sizes: vec![],
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product.id
    }

    fn order_for(product_id: &str, quantity: i64) -> NewOrder {
        NewOrder {
            customer_name: "Ada Lovelace".to_string(),
            customer_phone: "+44 20 7946 0001".to_string(),
            shipping_address: "1 Analytical Way, London".to_string(),
            items: vec![NewOrderLine {
                product_id: product_id.to_string(),
                quantity,
                size: Some("M".to_string()),
            }],
        }
    }

    #[tokio::test]
    async fn test_place_order_totals_and_stock() {
        let db = test_db().await;
        let product_id = insert_product(&db, "Linen Shirt", 5000, 10).await;

        let detail = db.orders().place_order(&order_for(&product_id, 2)).await.unwrap();

        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.order.total_cents, 10_000);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].price_at_purchase_cents, 5000);
        assert_eq!(detail.items[0].quantity, 2);

        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 8);
    }

    #[tokio::test]
    async fn test_place_order_multi_line_total() {
        let db = test_db().await;
        let shirt = insert_product(&db, "Shirt", 2500, 5).await;
        let scarf = insert_product(&db, "Scarf", 1999, 5).await;

        let new_order = NewOrder {
            items: vec![
                NewOrderLine {
                    product_id: shirt.clone(),
                    quantity: 2,
                    size: None,
                },
                NewOrderLine {
                    product_id: scarf,
                    quantity: 1,
                    size: None,
                },
            ],
            ..order_for(&shirt, 1)
        };

        let detail = db.orders().place_order(&new_order).await.unwrap();
        assert_eq!(detail.order.total_cents, 2 * 2500 + 1999);
        assert_eq!(detail.items.len(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let db = test_db().await;
        let product_id = insert_product(&db, "Scarf", 1999, 2).await;

        let err = db.orders().place_order(&order_for(&product_id, 3)).await.unwrap_err();
        assert!(matches!(err, DbError::InsufficientStock { .. }));

        // No order rows, stock untouched
        assert!(db.orders().list_all().await.unwrap().is_empty());
        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 2);
    }

    #[tokio::test]
    async fn test_failed_line_rolls_back_earlier_lines() {
        let db = test_db().await;
        let shirt = insert_product(&db, "Shirt", 2500, 10).await;
        let scarf = insert_product(&db, "Scarf", 1999, 1).await;

        let new_order = NewOrder {
            items: vec![
                NewOrderLine {
                    product_id: shirt.clone(),
                    quantity: 2,
                    size: None,
                },
                NewOrderLine {
                    product_id: scarf.clone(),
                    quantity: 5,
                    size: None,
                },
            ],
            ..order_for(&shirt, 1)
        };

        let err = db.orders().place_order(&new_order).await.unwrap_err();
        assert!(matches!(err, DbError::InsufficientStock { .. }));

        // The shirt reservation from the first line must be reverted
        let shirt = db.products().get_by_id(&shirt).await.unwrap().unwrap();
        assert_eq!(shirt.stock, 10);
        let scarf = db.products().get_by_id(&scarf).await.unwrap().unwrap();
        assert_eq!(scarf.stock, 1);
        assert!(db.orders().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_rejects_order() {
        let db = test_db().await;
        insert_product(&db, "Shirt", 2500, 10).await;

        let err = db
            .orders()
            .place_order(&order_for("no-such-product", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(db.orders().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_orders_never_oversell() {
        let db = test_db().await;
        let product_id = insert_product(&db, "Limited Run", 5000, 5).await;

        let orders = db.orders();
        let first_order = order_for(&product_id, 3);
        let second_order = order_for(&product_id, 3);
        let first = orders.place_order(&first_order);
        let second = orders.place_order(&second_order);
        let (a, b) = tokio::join!(first, second);

        // Stock 5 can satisfy one 3-unit order but never both
        assert!(a.is_ok() != b.is_ok());
        let failed = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(matches!(failed, DbError::InsufficientStock { .. }));

        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 2);
        assert_eq!(db.orders().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_on_shared_file_pool() {
        // Production pool shape: file-backed database, multiple WAL
        // connections. The loser of a stock race must get the stock
        // error, never a lock failure.
        let path = std::env::temp_dir().join(format!("velora-orders-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path)).await.unwrap();

        for _ in 0..10 {
            let product_id = insert_product(&db, "Limited Run", 5000, 5).await;

            let place = |db: Database, id: String| {
                tokio::spawn(async move { db.orders().place_order(&order_for(&id, 3)).await })
            };
            let first = place(db.clone(), product_id.clone());
            let second = place(db.clone(), product_id.clone());
            let (a, b) = (first.await.unwrap(), second.await.unwrap());

            assert!(a.is_ok() != b.is_ok(), "exactly one placement must win");
            let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
            assert!(
                matches!(
                    loser,
                    DbError::InsufficientStock {
                        available: 2,
                        requested: 3,
                        ..
                    }
                ),
                "loser must see the stock error, got: {loser}"
            );

            let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
            assert_eq!(product.stock, 2);
        }

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_order_total_overflow_rejected() {
        let db = test_db().await;
        let product_id = insert_product(&db, "Mispriced", i64::MAX, 5).await;

        let err = db.orders().place_order(&order_for(&product_id, 2)).await.unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));

        // The aborted transaction reverts the reservation
        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 5);
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let db = test_db().await;
        let product_id = insert_product(&db, "Shirt", 2500, 100).await;

        let first = db.orders().place_order(&order_for(&product_id, 1)).await.unwrap();
        let second = db.orders().place_order(&order_for(&product_id, 1)).await.unwrap();

        let all = db.orders().list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].order.id, second.order.id);
        assert_eq!(all[1].order.id, first.order.id);
        assert_eq!(all[0].items.len(), 1);

        // Read-only: a second listing sees the same orders in the same order
        let again = db.orders().list_all().await.unwrap();
        let ids = |v: &[OrderDetail]| v.iter().map(|d| d.order.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&all), ids(&again));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = test_db().await;
        let product_id = insert_product(&db, "Shirt", 2500, 10).await;
        let placed = db.orders().place_order(&order_for(&product_id, 1)).await.unwrap();

        let loaded = db.orders().get_by_id(&placed.order.id).await.unwrap().unwrap();
        assert_eq!(loaded.order.customer_name, "Ada Lovelace");
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].size.as_deref(), Some("M"));

        assert!(db.orders().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_status_guarded() {
        let db = test_db().await;
        let product_id = insert_product(&db, "Shirt", 2500, 10).await;
        let placed = db.orders().place_order(&order_for(&product_id, 1)).await.unwrap();
        let id = placed.order.id;

        let applied = db
            .orders()
            .set_status(&id, OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap();
        assert!(applied);

        // Stale guard: the order is no longer pending
        let applied = db
            .orders()
            .set_status(&id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert!(!applied);

        let loaded = db.orders().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(loaded.order.status, OrderStatus::Processing);

        let err = db
            .orders()
            .set_status("missing", OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
