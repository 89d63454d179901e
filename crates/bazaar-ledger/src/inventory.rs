//! # Inventory Posting Service
//!
//! Manual stock adjustments: the audited mutation path for inventory changes
//! that are not sales.
//!
//! ## Posting Order
//! The inventory delta is applied FIRST, via the conditional update; the
//! audit row is written only after the delta lands. A rejected reduction
//! therefore leaves no trace in the audit trail, and every audit row
//! corresponds to a delta that actually happened.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use bazaar_core::validation::{validate_quantity, validate_uuid};
use bazaar_core::{AdjustmentKind, AdjustmentReason, CoreError, StockAdjustment};
use bazaar_db::{Database, DeltaOutcome};

use crate::error::LedgerResult;

/// Input for posting a stock adjustment.
#[derive(Debug, Clone)]
pub struct NewAdjustment {
    pub product_id: String,
    pub kind: AdjustmentKind,
    /// Always positive; the direction lives in `kind`.
    pub quantity: i64,
    pub reason: AdjustmentReason,
    pub notes: Option<String>,
    /// Acting user (external identity provider).
    pub created_by: String,
}

/// Service for audited manual inventory changes.
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    /// Creates a new InventoryService.
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    /// Posts a manual stock adjustment.
    ///
    /// ## Steps
    /// 1. Validate the input (positive quantity, well-formed product id)
    /// 2. Resolve the product (snapshot its unit for the audit row)
    /// 3. Apply the signed delta through the conditional update
    /// 4. On success, append the audit row
    ///
    /// A reduction below zero fails with `InsufficientInventory` and changes
    /// nothing.
    pub async fn post_adjustment(&self, input: NewAdjustment) -> LedgerResult<StockAdjustment> {
        validate_uuid(&input.product_id).map_err(CoreError::from)?;
        validate_quantity(input.quantity).map_err(CoreError::from)?;

        let product = self
            .db
            .products()
            .get_by_id(&input.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(input.product_id.clone()))?;

        let delta = match input.kind {
            AdjustmentKind::Addition => input.quantity,
            AdjustmentKind::Reduction => -input.quantity,
        };

        debug!(
            product_id = %input.product_id,
            delta = %delta,
            reason = ?input.reason,
            "Posting stock adjustment"
        );

        let outcome = self
            .db
            .products()
            .apply_inventory_delta(&input.product_id, delta)
            .await?;

        let new_quantity = match outcome {
            DeltaOutcome::Applied { new_quantity } => new_quantity,
            DeltaOutcome::Insufficient { available } => {
                return Err(CoreError::InsufficientInventory {
                    product_id: input.product_id,
                    available,
                    requested: input.quantity,
                }
                .into());
            }
        };

        let adjustment = StockAdjustment {
            id: Uuid::new_v4().to_string(),
            product_id: input.product_id,
            kind: input.kind,
            quantity: input.quantity,
            unit: product.unit,
            reason: input.reason,
            notes: input.notes,
            created_by: input.created_by,
            created_at: Utc::now(),
        };

        self.db.adjustments().insert(&adjustment).await?;

        info!(
            id = %adjustment.id,
            product_id = %adjustment.product_id,
            new_quantity = %new_quantity,
            "Stock adjustment posted"
        );

        Ok(adjustment)
    }

    /// Adjustment history, newest first, optionally scoped to one product.
    pub async fn history(
        &self,
        product_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> LedgerResult<Vec<StockAdjustment>> {
        Ok(self.db.adjustments().list(product_id, limit, offset).await?)
    }

    /// Total adjustment count for the same filter as [`Self::history`].
    pub async fn history_count(&self, product_id: Option<&str>) -> LedgerResult<i64> {
        Ok(self.db.adjustments().count(product_id).await?)
    }
}
