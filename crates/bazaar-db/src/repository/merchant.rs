//! # Merchant Repository
//!
//! Database operations for merchants.
//!
//! The ledger owns exactly one mutable merchant field:
//! `current_balance_paisa`, the amount currently owed to the merchant. It is
//! mutated only through [`MerchantRepository::apply_balance_delta`], the same
//! atomic delta pattern the inventory ledger uses, minus the floor: balances
//! are signed and may legitimately go negative.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::Merchant;

const MERCHANT_COLUMNS: &str = "id, name, contact_person, phone, email, \
     bank_account_name, bank_account_number, bank_name, bank_ifsc_code, \
     current_balance_paisa, created_at, updated_at";

/// Repository for merchant database operations.
#[derive(Debug, Clone)]
pub struct MerchantRepository {
    pool: SqlitePool,
}

impl MerchantRepository {
    /// Creates a new MerchantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MerchantRepository { pool }
    }

    /// Gets a merchant by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Merchant>> {
        let merchant = sqlx::query_as::<_, Merchant>(&format!(
            "SELECT {MERCHANT_COLUMNS} FROM merchants WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(merchant)
    }

    /// Inserts a new merchant (directory collaborator and test fixtures).
    pub async fn insert(&self, merchant: &Merchant) -> DbResult<()> {
        debug!(name = %merchant.name, "Inserting merchant");

        sqlx::query(
            "INSERT INTO merchants ( \
                 id, name, contact_person, phone, email, \
                 bank_account_name, bank_account_number, bank_name, bank_ifsc_code, \
                 current_balance_paisa, created_at, updated_at \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&merchant.id)
        .bind(&merchant.name)
        .bind(&merchant.contact_person)
        .bind(&merchant.phone)
        .bind(&merchant.email)
        .bind(&merchant.bank_account_name)
        .bind(&merchant.bank_account_number)
        .bind(&merchant.bank_name)
        .bind(&merchant.bank_ifsc_code)
        .bind(merchant.current_balance_paisa)
        .bind(merchant.created_at)
        .bind(merchant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a signed delta to a merchant's outstanding balance.
    ///
    /// Single atomic read-modify-write; never read-then-write from
    /// application memory.
    ///
    /// ## Returns
    /// The post-update balance in paisa, or `DbError::NotFound`.
    pub async fn apply_balance_delta(&self, id: &str, delta_paisa: i64) -> DbResult<i64> {
        debug!(id = %id, delta = %delta_paisa, "Applying balance delta");

        let now = Utc::now();

        let new_balance: Option<i64> = sqlx::query_scalar(
            "UPDATE merchants \
             SET current_balance_paisa = current_balance_paisa + ?2, updated_at = ?3 \
             WHERE id = ?1 \
             RETURNING current_balance_paisa",
        )
        .bind(id)
        .bind(delta_paisa)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        new_balance.ok_or_else(|| DbError::not_found("Merchant", id))
    }
}
