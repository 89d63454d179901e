//! # Payout Repository
//!
//! Database operations for merchant payouts.
//!
//! Payout updates are conditional on the status the caller observed, so a
//! concurrent status change between read and write matches no row instead of
//! silently double-firing a balance trigger. The service layer turns a missed
//! condition into a retry.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{Payout, PayoutStatus};

const PAYOUT_COLUMNS: &str = "id, merchant_id, amount_paisa, date, method, \
     reference_number, notes, status, created_by, created_at, updated_at";

/// Repository for payout database operations.
#[derive(Debug, Clone)]
pub struct PayoutRepository {
    pool: SqlitePool,
}

impl PayoutRepository {
    /// Creates a new PayoutRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PayoutRepository { pool }
    }

    /// Inserts a new payout.
    pub async fn insert(&self, payout: &Payout) -> DbResult<()> {
        debug!(
            merchant_id = %payout.merchant_id,
            amount = %payout.amount_paisa,
            "Inserting payout"
        );

        sqlx::query(
            "INSERT INTO payouts ( \
                 id, merchant_id, amount_paisa, date, method, \
                 reference_number, notes, status, created_by, created_at, updated_at \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&payout.id)
        .bind(&payout.merchant_id)
        .bind(payout.amount_paisa)
        .bind(payout.date)
        .bind(payout.method)
        .bind(&payout.reference_number)
        .bind(&payout.notes)
        .bind(payout.status)
        .bind(&payout.created_by)
        .bind(payout.created_at)
        .bind(payout.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a payout by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payout>> {
        let payout = sqlx::query_as::<_, Payout>(&format!(
            "SELECT {PAYOUT_COLUMNS} FROM payouts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payout)
    }

    /// Writes the merged payout, but only if its status still equals
    /// `expected_status`.
    ///
    /// ## Returns
    /// `true` when the row was updated, `false` when the condition missed
    /// (the status changed underneath the caller).
    pub async fn update_if_status(
        &self,
        payout: &Payout,
        expected_status: PayoutStatus,
    ) -> DbResult<bool> {
        debug!(id = %payout.id, "Updating payout");

        let result = sqlx::query(
            "UPDATE payouts \
             SET merchant_id = ?2, amount_paisa = ?3, date = ?4, method = ?5, \
                 reference_number = ?6, notes = ?7, status = ?8, updated_at = ?9 \
             WHERE id = ?1 AND status = ?10",
        )
        .bind(&payout.id)
        .bind(&payout.merchant_id)
        .bind(payout.amount_paisa)
        .bind(payout.date)
        .bind(payout.method)
        .bind(&payout.reference_number)
        .bind(&payout.notes)
        .bind(payout.status)
        .bind(payout.updated_at)
        .bind(expected_status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a payout, but only if its status still equals
    /// `expected_status`. The same conditional guard as
    /// [`Self::update_if_status`], so a racing status flip cannot strand a
    /// balance delta.
    ///
    /// ## Returns
    /// `true` when the row was deleted, `false` when the condition missed.
    pub async fn delete_if_status(
        &self,
        id: &str,
        expected_status: PayoutStatus,
    ) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM payouts WHERE id = ?1 AND status = ?2")
            .bind(id)
            .bind(expected_status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists payouts newest first, optionally filtered by merchant and status.
    pub async fn list(
        &self,
        merchant_id: Option<&str>,
        status: Option<PayoutStatus>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Payout>> {
        let payouts = sqlx::query_as::<_, Payout>(&format!(
            "SELECT {PAYOUT_COLUMNS} FROM payouts \
             WHERE (?1 IS NULL OR merchant_id = ?1) \
               AND (?2 IS NULL OR status = ?2) \
             ORDER BY date DESC \
             LIMIT ?3 OFFSET ?4"
        ))
        .bind(merchant_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(payouts)
    }

    /// Counts payouts matching the same filters as [`Self::list`].
    pub async fn count(
        &self,
        merchant_id: Option<&str>,
        status: Option<PayoutStatus>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payouts \
             WHERE (?1 IS NULL OR merchant_id = ?1) \
               AND (?2 IS NULL OR status = ?2)",
        )
        .bind(merchant_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
