//! # Inventory Read Models
//!
//! Derived views over the ledger: low stock, expiring stock, turnover and
//! the dashboard stat block. All are computed on demand from current rows;
//! nothing here is cached or stored.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::turnover::{compute_turnover, days_until_expiry, expires_within, TurnoverReport};
use bazaar_core::{Product, EXPIRY_WINDOW_DAYS, LOW_STOCK_THRESHOLD, TURNOVER_WINDOW_DAYS};
use bazaar_db::Database;

use crate::error::LedgerResult;

// =============================================================================
// Outputs
// =============================================================================

/// A perishable product inside the expiry window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiringProduct {
    pub product: Product,
    /// Whole days until expiry, rounded up. Negative when already expired.
    pub days_left: i64,
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_products: i64,
    pub low_stock: i64,
    pub expiring_soon: i64,
}

/// Service for the inventory read models.
#[derive(Debug, Clone)]
pub struct ReportService {
    db: Database,
}

impl ReportService {
    /// Creates a new ReportService.
    pub fn new(db: Database) -> Self {
        ReportService { db }
    }

    /// Active products at or below the low-stock threshold, emptiest first.
    pub async fn low_stock(&self) -> LedgerResult<Vec<Product>> {
        Ok(self.db.products().low_stock(LOW_STOCK_THRESHOLD).await?)
    }

    /// Perishable products expiring inside the look-ahead window, soonest
    /// first. Already-expired stock is included with negative `days_left`.
    pub async fn expiring_soon(&self) -> LedgerResult<Vec<ExpiringProduct>> {
        let now = Utc::now();

        let mut expiring: Vec<ExpiringProduct> = self
            .db
            .products()
            .perishables()
            .await?
            .into_iter()
            .filter_map(|product| {
                let shelf_life = product.shelf_life_days?;
                if !expires_within(product.created_at, shelf_life, now, EXPIRY_WINDOW_DAYS) {
                    return None;
                }
                let days_left = days_until_expiry(product.created_at, shelf_life, now);
                Some(ExpiringProduct { product, days_left })
            })
            .collect();

        expiring.sort_by_key(|e| e.days_left);

        Ok(expiring)
    }

    /// Turnover report over the trailing window: top products by turnover
    /// rate and category averages over that ranked set.
    pub async fn inventory_turnover(&self) -> LedgerResult<TurnoverReport> {
        let start = Utc::now() - Duration::days(TURNOVER_WINDOW_DAYS);

        let products = self.db.products().stock_rows().await?;
        let sold = self.db.sales().sold_since(start).await?;
        let adjustments = self.db.adjustments().totals_since(start).await?;

        Ok(compute_turnover(&products, &sold, &adjustments))
    }

    /// Dashboard counters: active products, low-stock count, expiring count.
    pub async fn inventory_stats(&self) -> LedgerResult<InventoryStats> {
        let total_products = self.db.products().count().await?;
        let low_stock = self.db.products().low_stock_count(LOW_STOCK_THRESHOLD).await?;
        let expiring_soon = self.expiring_soon().await?.len() as i64;

        Ok(InventoryStats {
            total_products,
            low_stock,
            expiring_soon,
        })
    }
}
