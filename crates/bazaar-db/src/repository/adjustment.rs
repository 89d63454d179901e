//! # Stock Adjustment Repository
//!
//! Append-only audit records for manual inventory changes. Rows are inserted
//! once and never updated or deleted; history queries read them back in
//! reverse chronological order.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::turnover::AdjustmentTotal;
use bazaar_core::StockAdjustment;
use chrono::{DateTime, Utc};

const ADJUSTMENT_COLUMNS: &str =
    "id, product_id, kind, quantity, unit, reason, notes, created_by, created_at";

/// Repository for stock adjustment audit records.
#[derive(Debug, Clone)]
pub struct AdjustmentRepository {
    pool: SqlitePool,
}

impl AdjustmentRepository {
    /// Creates a new AdjustmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdjustmentRepository { pool }
    }

    /// Inserts an audit record. Called only after the corresponding inventory
    /// delta has landed.
    pub async fn insert(&self, adjustment: &StockAdjustment) -> DbResult<()> {
        debug!(
            product_id = %adjustment.product_id,
            quantity = %adjustment.quantity,
            "Inserting stock adjustment"
        );

        sqlx::query(
            "INSERT INTO stock_adjustments ( \
                 id, product_id, kind, quantity, unit, reason, notes, created_by, created_at \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&adjustment.id)
        .bind(&adjustment.product_id)
        .bind(adjustment.kind)
        .bind(adjustment.quantity)
        .bind(adjustment.unit)
        .bind(adjustment.reason)
        .bind(&adjustment.notes)
        .bind(&adjustment.created_by)
        .bind(adjustment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an adjustment by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockAdjustment>> {
        let adjustment = sqlx::query_as::<_, StockAdjustment>(&format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM stock_adjustments WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(adjustment)
    }

    /// Lists adjustments newest first, optionally scoped to one product.
    pub async fn list(
        &self,
        product_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<StockAdjustment>> {
        let adjustments = sqlx::query_as::<_, StockAdjustment>(&format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM stock_adjustments \
             WHERE (?1 IS NULL OR product_id = ?1) \
             ORDER BY created_at DESC \
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(product_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(adjustments)
    }

    /// Counts adjustments, optionally scoped to one product.
    pub async fn count(&self, product_id: Option<&str>) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_adjustments WHERE (?1 IS NULL OR product_id = ?1)",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Summed quantities per (product, kind, reason) since `start`, feeding
    /// the turnover report.
    pub async fn totals_since(&self, start: DateTime<Utc>) -> DbResult<Vec<AdjustmentTotal>> {
        let totals = sqlx::query_as::<_, AdjustmentTotal>(
            "SELECT product_id, kind, reason, SUM(quantity) AS quantity \
             FROM stock_adjustments \
             WHERE created_at >= ?1 \
             GROUP BY product_id, kind, reason",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }
}
