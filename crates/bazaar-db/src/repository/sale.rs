//! # Sale Repository
//!
//! Append-only sale ledger: a transaction header plus its line items, written
//! atomically in one database transaction. Headers and items are never updated
//! after posting.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{Transaction, TransactionItem};
use chrono::{DateTime, Utc};

const TRANSACTION_COLUMNS: &str = "id, date, operator, customer_name, customer_phone, \
     customer_email, subtotal_paisa, discount_paisa, tax_paisa, total_paisa, \
     payment_method, payment_status, notes, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, transaction_id, product_id, name_snapshot, unit, \
     quantity, unit_price_paisa, discount_paisa, line_total_paisa, position";

/// Repository for the sale ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale header and all its items in one database transaction.
    ///
    /// Either the whole sale lands or none of it does; a sale can never exist
    /// with a partial item list.
    pub async fn insert_sale(
        &self,
        sale: &Transaction,
        items: &[TransactionItem],
    ) -> DbResult<()> {
        debug!(id = %sale.id, items = items.len(), "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO transactions ( \
                 id, date, operator, customer_name, customer_phone, customer_email, \
                 subtotal_paisa, discount_paisa, tax_paisa, total_paisa, \
                 payment_method, payment_status, notes, created_at, updated_at \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .bind(&sale.id)
        .bind(sale.date)
        .bind(&sale.operator)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .bind(&sale.customer_email)
        .bind(sale.subtotal_paisa)
        .bind(sale.discount_paisa)
        .bind(sale.tax_paisa)
        .bind(sale.total_paisa)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO transaction_items ( \
                     id, transaction_id, product_id, name_snapshot, unit, \
                     quantity, unit_price_paisa, discount_paisa, line_total_paisa, position \
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.unit)
            .bind(item.quantity)
            .bind(item.unit_price_paisa)
            .bind(item.discount_paisa)
            .bind(item.line_total_paisa)
            .bind(item.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Gets a sale header by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let sale = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale's items in their posted order.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM transaction_items \
             WHERE transaction_id = ?1 \
             ORDER BY position ASC"
        ))
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sale headers newest first.
    pub async fn list_recent(&self, limit: i64, offset: i64) -> DbResult<Vec<Transaction>> {
        let sales = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             ORDER BY date DESC \
             LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts all sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Quantity sold per product since `start`, feeding the turnover report.
    pub async fn sold_since(&self, start: DateTime<Utc>) -> DbResult<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT ti.product_id, SUM(ti.quantity) \
             FROM transaction_items ti \
             JOIN transactions t ON t.id = ti.transaction_id \
             WHERE t.date >= ?1 \
             GROUP BY ti.product_id",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
