//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Public listing with an optional category filter
//! - Admin CRUD
//!
//! Stock is deliberately NOT mutated here during sales - that is the
//! inventory ledger's job (see [`crate::repository::inventory`]). Admin
//! edits go through [`ProductPatch`]: only submitted columns are written,
//! so an edit that omits `stock` can never clobber a reservation that
//! committed after the admin loaded the form. Restocking is an explicit
//! `stock` field in the patch (an absolute value, not a delta).

use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use velora_core::Product;

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw products row; `sizes` is a JSON TEXT column.
#[derive(Debug, FromRow)]
struct ProductRecord {
    id: String,
    name: String,
    description: Option<String>,
    price_cents: i64,
    category: Option<String>,
    stock: i64,
    image: Option<String>,
    sizes: String,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Product {
            id: r.id,
            name: r.name,
            description: r.description,
            price_cents: r.price_cents,
            category: r.category,
            stock: r.stock,
            image: r.image,
            // A malformed sizes column degrades to "not sized" rather
            // than failing the whole read.
            sizes: serde_json::from_str(&r.sizes).unwrap_or_default(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, category, stock, image, sizes, created_at, updated_at";

// =============================================================================
// Partial Updates
// =============================================================================

/// A partial catalog edit: `None` fields keep their stored value and are
/// never written.
#[derive(Debug, Default, Clone)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    pub sizes: Option<Vec<String>>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let catalog = repo.list(Some("shirts")).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, optionally filtered by category, sorted by name.
    pub async fn list(&self, category: Option<&str>) -> DbResult<Vec<Product>> {
        let records: Vec<ProductRecord> = match category {
            Some(category) => {
                sqlx::query_as(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ?1 ORDER BY name"
                ))
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(count = records.len(), "Listed products");
        Ok(records.into_iter().map(Product::from).collect())
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let record: Option<ProductRecord> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Product::from))
    }

    /// Inserts a new product.
    ///
    /// ## Arguments
    /// * `product` - Product to insert (id generated beforehand)
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let sizes = serde_json::to_string(&product.sizes).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, category,
                stock, image, sizes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(product.stock)
        .bind(&product.image)
        .bind(sizes)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Applies a partial edit, writing only the submitted columns.
    ///
    /// The single UPDATE touches nothing the patch does not name, so a
    /// stock reservation committed between the admin's read and this
    /// write survives unless the patch itself sets `stock`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored row after the write
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE products SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(name) = &patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = &patch.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(price_cents) = patch.price_cents {
            query.push(", price_cents = ").push_bind(price_cents);
        }
        if let Some(category) = &patch.category {
            query.push(", category = ").push_bind(category);
        }
        if let Some(stock) = patch.stock {
            query.push(", stock = ").push_bind(stock);
        }
        if let Some(image) = &patch.image {
            query.push(", image = ").push_bind(image);
        }
        if let Some(sizes) = &patch.sizes {
            let sizes = serde_json::to_string(sizes).unwrap_or_else(|_| "[]".to_string());
            query.push(", sizes = ").push_bind(sizes);
        }

        query.push(" WHERE id = ").push_bind(id);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product from the catalog.
    ///
    /// Order history is unaffected: line items snapshot price/quantity/size
    /// and their product reference is set to NULL by the schema.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts catalog products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_product(name: &str, category: Option<&str>) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            name: name.to_string(),
            description: Some("A sample".to_string()),
            price_cents: 2599,
            category: category.map(str::to_string),
            stock: 10,
            image: None,
            sizes: vec!["S".to_string(), "M".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = sample_product("Wool Scarf", Some("accessories"));

        db.products().insert(&product).await.unwrap();
        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();

        assert_eq!(loaded.name, "Wool Scarf");
        assert_eq!(loaded.price_cents, 2599);
        assert_eq!(loaded.sizes, vec!["S".to_string(), "M".to_string()]);
    }

    #[tokio::test]
    async fn test_list_with_category_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&sample_product("Shirt", Some("shirts")))
            .await
            .unwrap();
        db.products()
            .insert(&sample_product("Scarf", Some("accessories")))
            .await
            .unwrap();

        assert_eq!(db.products().list(None).await.unwrap().len(), 2);
        let shirts = db.products().list(Some("shirts")).await.unwrap();
        assert_eq!(shirts.len(), 1);
        assert_eq!(shirts[0].name, "Shirt");
        assert!(db.products().list(Some("shoes")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .products()
            .update("no-such-id", &ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_partial_update_writes_only_submitted_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = sample_product("Denim Jacket", Some("jackets"));
        db.products().insert(&product).await.unwrap();

        let patch = ProductPatch {
            price_cents: Some(4900),
            ..ProductPatch::default()
        };
        let updated = db.products().update(&product.id, &patch).await.unwrap();

        assert_eq!(updated.price_cents, 4900);
        assert_eq!(updated.name, "Denim Jacket");
        assert_eq!(updated.stock, 10);
        assert_eq!(updated.sizes, vec!["S".to_string(), "M".to_string()]);
    }

    #[tokio::test]
    async fn test_stockless_update_preserves_concurrent_sale() {
        // An admin edit that omits stock must not resurrect units a sale
        // reserved after the admin loaded the product.
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = sample_product("Canvas Tote", None);
        db.products().insert(&product).await.unwrap();

        {
            let mut conn = db.pool().acquire().await.unwrap();
            crate::repository::inventory::reserve(&mut conn, &product.id, 2)
                .await
                .unwrap();
        }

        let patch = ProductPatch {
            price_cents: Some(4900),
            ..ProductPatch::default()
        };
        let updated = db.products().update(&product.id, &patch).await.unwrap();
        assert_eq!(updated.price_cents, 4900);
        assert_eq!(updated.stock, 8, "sold units must stay sold");

        // An explicit stock field is how restocking happens
        let restock = ProductPatch {
            stock: Some(50),
            ..ProductPatch::default()
        };
        let updated = db.products().update(&product.id, &restock).await.unwrap();
        assert_eq!(updated.stock, 50);
        assert_eq!(updated.price_cents, 4900);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = sample_product("Linen Shirt", None);
        db.products().insert(&product).await.unwrap();

        db.products().delete(&product.id).await.unwrap();
        assert!(db.products().get_by_id(&product.id).await.unwrap().is_none());

        let err = db.products().delete(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
