//! # Product Repository
//!
//! Database operations for products.
//!
//! The ledger owns exactly one mutable product field: `inventory_quantity`.
//! Everything else here exists so collaborators (catalog, read models, test
//! fixtures) can see the rows the ledger mutates.
//!
//! ## Delta Pattern
//! ```text
//! WRONG: absolute update (lost-update race between two sales)
//!   UPDATE products SET inventory_quantity = 7 WHERE id = ?
//!
//! RIGHT: conditional delta update, floor checked in the same statement
//!   UPDATE products
//!   SET inventory_quantity = inventory_quantity + ?delta
//!   WHERE id = ? AND inventory_quantity + ?delta >= 0
//! ```
//! Two racing decrements serialize inside SQLite; whichever would take the
//! quantity negative simply matches no row and leaves the ledger untouched.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::turnover::StockRow;
use bazaar_core::Product;

const PRODUCT_COLUMNS: &str = "id, sku, name, category, unit, price_paisa, \
     inventory_quantity, shelf_life_days, is_active, created_at, updated_at";

/// Outcome of a conditional inventory delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOutcome {
    /// The delta landed; carries the post-update quantity.
    Applied { new_quantity: i64 },
    /// The delta would have taken the quantity negative; nothing changed.
    Insufficient { available: i64 },
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product (catalog collaborator and test fixtures).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            "INSERT INTO products ( \
                 id, sku, name, category, unit, price_paisa, \
                 inventory_quantity, shelf_life_days, is_active, created_at, updated_at \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.unit)
        .bind(product.price_paisa)
        .bind(product.inventory_quantity)
        .bind(product.shelf_life_days)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a signed delta to a product's on-hand quantity.
    ///
    /// This is THE inventory ledger mutation: a single atomic conditional
    /// read-modify-write. The non-negative floor is evaluated inside the
    /// UPDATE itself, never against a previously read quantity.
    ///
    /// ## Returns
    /// * `Ok(DeltaOutcome::Applied)` - new quantity after the delta
    /// * `Ok(DeltaOutcome::Insufficient)` - floor would be crossed; no change
    /// * `Err(DbError::NotFound)` - product doesn't exist
    pub async fn apply_inventory_delta(&self, id: &str, delta: i64) -> DbResult<DeltaOutcome> {
        debug!(id = %id, delta = %delta, "Applying inventory delta");

        let now = Utc::now();

        let new_quantity: Option<i64> = sqlx::query_scalar(
            "UPDATE products \
             SET inventory_quantity = inventory_quantity + ?2, updated_at = ?3 \
             WHERE id = ?1 AND inventory_quantity + ?2 >= 0 \
             RETURNING inventory_quantity",
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(new_quantity) = new_quantity {
            return Ok(DeltaOutcome::Applied { new_quantity });
        }

        // No row matched: either the product is missing or the floor held.
        let available: Option<i64> =
            sqlx::query_scalar("SELECT inventory_quantity FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match available {
            Some(available) => Ok(DeltaOutcome::Insufficient { available }),
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Active products at or below the low-stock threshold, ascending by
    /// quantity so the emptiest shelves list first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND inventory_quantity <= ?1 \
             ORDER BY inventory_quantity ASC, name ASC"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Active products with a shelf life, for the expiring-soon read model.
    pub async fn perishables(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND shelf_life_days IS NOT NULL AND shelf_life_days > 0 \
             ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Stock snapshot rows for the turnover report.
    pub async fn stock_rows(&self) -> DbResult<Vec<StockRow>> {
        let rows = sqlx::query_as::<_, StockRow>(
            "SELECT id, name, category, inventory_quantity AS current_stock \
             FROM products WHERE is_active = 1",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts active products at or below the low-stock threshold.
    pub async fn low_stock_count(&self, threshold: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE is_active = 1 AND inventory_quantity <= ?1",
        )
        .bind(threshold)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
