//! # Payout Posting Service
//!
//! Merchant payouts and the balance transition trigger.
//!
//! ## Transition Trigger
//! A merchant's `current_balance_paisa` moves only when a payout crosses the
//! completed boundary: creation in completed settles (balance decreases),
//! leaving completed reinstates, deletion of a completed payout reinstates.
//! Each crossing fires exactly one signed delta; field edits that stay on the
//! same side of the boundary fire nothing.
//!
//! ## Concurrency
//! Updates are conditional on the status the service read. If another write
//! moved the status in between, the conditional update matches no row and the
//! whole read-merge-write cycle retries once before giving up with
//! `ConcurrentModification`. This keeps the trigger from double-firing.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use bazaar_core::validation::{validate_payout_amount, validate_uuid};
use bazaar_core::{BalanceEffect, CoreError, Money, Payout, PayoutMethod, PayoutStatus};
use bazaar_db::Database;

use crate::error::{LedgerError, LedgerResult};

// =============================================================================
// Inputs
// =============================================================================

/// Input for creating a payout.
#[derive(Debug, Clone)]
pub struct NewPayout {
    pub merchant_id: String,
    /// Always positive, in paisa.
    pub amount_paisa: i64,
    /// Business date of the payout. Defaults to now.
    pub date: Option<DateTime<Utc>>,
    pub method: PayoutMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    /// Defaults to completed when not given.
    pub status: Option<PayoutStatus>,
    /// Acting user (external identity provider).
    pub created_by: String,
}

/// Partial update for a payout. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct PayoutPatch {
    pub amount_paisa: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub method: Option<PayoutMethod>,
    pub reference_number: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub status: Option<PayoutStatus>,
}

/// Service for payout lifecycle and merchant balances.
#[derive(Debug, Clone)]
pub struct PayoutService {
    db: Database,
}

impl PayoutService {
    /// Creates a new PayoutService.
    pub fn new(db: Database) -> Self {
        PayoutService { db }
    }

    /// Creates a payout.
    ///
    /// When the payout is created directly in completed status, the
    /// merchant's balance decreases by its amount in the same posting.
    pub async fn create_payout(&self, input: NewPayout) -> LedgerResult<Payout> {
        validate_uuid(&input.merchant_id).map_err(CoreError::from)?;
        validate_payout_amount(input.amount_paisa).map_err(CoreError::from)?;

        self.db
            .merchants()
            .get_by_id(&input.merchant_id)
            .await?
            .ok_or_else(|| CoreError::MerchantNotFound(input.merchant_id.clone()))?;

        let now = Utc::now();
        let payout = Payout {
            id: Uuid::new_v4().to_string(),
            merchant_id: input.merchant_id,
            amount_paisa: input.amount_paisa,
            date: input.date.unwrap_or(now),
            method: input.method,
            reference_number: input.reference_number,
            notes: input.notes,
            status: input.status.unwrap_or_default(),
            created_by: input.created_by,
            created_at: now,
            updated_at: now,
        };

        self.db.payouts().insert(&payout).await?;

        let effect = BalanceEffect::for_creation(payout.status);
        self.apply_effect(&payout.merchant_id, effect, payout.amount()).await?;

        info!(
            id = %payout.id,
            merchant_id = %payout.merchant_id,
            status = ?payout.status,
            "Payout created"
        );

        Ok(payout)
    }

    /// Applies a partial update to a payout.
    ///
    /// Read-merge-write, conditional on the status that was read; retried
    /// once on a missed condition. When the merge crosses the completed
    /// boundary the balance delta uses the post-patch amount, in both
    /// directions.
    pub async fn update_payout(&self, id: &str, patch: PayoutPatch) -> LedgerResult<Payout> {
        if let Some(amount) = patch.amount_paisa {
            validate_payout_amount(amount).map_err(CoreError::from)?;
        }

        for attempt in 0..2 {
            let before = self
                .db
                .payouts()
                .get_by_id(id)
                .await?
                .ok_or_else(|| CoreError::PayoutNotFound(id.to_string()))?;

            let mut merged = before.clone();
            if let Some(amount) = patch.amount_paisa {
                merged.amount_paisa = amount;
            }
            if let Some(date) = patch.date {
                merged.date = date;
            }
            if let Some(method) = patch.method {
                merged.method = method;
            }
            if let Some(ref reference_number) = patch.reference_number {
                merged.reference_number = reference_number.clone();
            }
            if let Some(ref notes) = patch.notes {
                merged.notes = notes.clone();
            }
            if let Some(status) = patch.status {
                merged.status = status;
            }
            merged.updated_at = Utc::now();

            let effect = BalanceEffect::for_transition(before.status, merged.status);

            let applied = self
                .db
                .payouts()
                .update_if_status(&merged, before.status)
                .await?;

            if !applied {
                debug!(id = %id, attempt = attempt, "Payout status moved underneath update; retrying");
                continue;
            }

            self.apply_effect(&merged.merchant_id, effect, merged.amount()).await?;

            info!(id = %id, status = ?merged.status, "Payout updated");
            return Ok(merged);
        }

        Err(LedgerError::ConcurrentModification {
            entity: "Payout".to_string(),
            id: id.to_string(),
        })
    }

    /// Deletes a payout.
    ///
    /// Deleting a completed payout reinstates its amount on the merchant's
    /// balance; deleting a pending or failed one changes no balance. The
    /// delete is conditional on the status that was read, with the same
    /// retry-once cycle as updates, so a racing status flip cannot settle a
    /// balance that is then never reinstated.
    pub async fn delete_payout(&self, id: &str) -> LedgerResult<()> {
        for attempt in 0..2 {
            let payout = self
                .db
                .payouts()
                .get_by_id(id)
                .await?
                .ok_or_else(|| CoreError::PayoutNotFound(id.to_string()))?;

            let deleted = self
                .db
                .payouts()
                .delete_if_status(id, payout.status)
                .await?;

            if !deleted {
                debug!(id = %id, attempt = attempt, "Payout status moved underneath delete; retrying");
                continue;
            }

            let effect = BalanceEffect::for_deletion(payout.status);
            self.apply_effect(&payout.merchant_id, effect, payout.amount()).await?;

            info!(id = %id, "Payout deleted");
            return Ok(());
        }

        Err(LedgerError::ConcurrentModification {
            entity: "Payout".to_string(),
            id: id.to_string(),
        })
    }

    /// Gets a payout by ID.
    pub async fn get_payout(&self, id: &str) -> LedgerResult<Payout> {
        let payout = self
            .db
            .payouts()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::PayoutNotFound(id.to_string()))?;

        Ok(payout)
    }

    /// Lists payouts newest first, optionally filtered.
    pub async fn list_payouts(
        &self,
        merchant_id: Option<&str>,
        status: Option<PayoutStatus>,
        limit: i64,
        offset: i64,
    ) -> LedgerResult<Vec<Payout>> {
        Ok(self.db.payouts().list(merchant_id, status, limit, offset).await?)
    }

    /// Payout count for the same filters as [`Self::list_payouts`].
    pub async fn count_payouts(
        &self,
        merchant_id: Option<&str>,
        status: Option<PayoutStatus>,
    ) -> LedgerResult<i64> {
        Ok(self.db.payouts().count(merchant_id, status).await?)
    }

    /// Applies one balance effect. No-op for [`BalanceEffect::None`].
    async fn apply_effect(
        &self,
        merchant_id: &str,
        effect: BalanceEffect,
        amount: Money,
    ) -> LedgerResult<()> {
        let delta = effect.balance_delta(amount);
        if delta.is_zero() {
            return Ok(());
        }

        let new_balance = self
            .db
            .merchants()
            .apply_balance_delta(merchant_id, delta.paisa())
            .await?;

        debug!(
            merchant_id = %merchant_id,
            delta_paisa = %delta.paisa(),
            new_balance_paisa = %new_balance,
            "Merchant balance adjusted"
        );

        Ok(())
    }
}
