//! # Sale Posting Service
//!
//! Posts sales to the append-only ledger and decrements inventory.
//!
//! ## Failure Policy
//! The sale record itself is atomic (header plus items in one database
//! transaction). Inventory decrements run afterwards, per line, and a line
//! that cannot decrement (product vanished, or on-hand would go negative)
//! is logged and skipped; the sale stands. The cash drawer is the source of
//! truth at the counter, so the financial record wins over the stock count
//! and the discrepancy surfaces in the low-stock and turnover read models.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use bazaar_core::pricing::{compute_totals, SaleLine};
use bazaar_core::validation::{validate_price_paisa, validate_quantity, validate_uuid};
use bazaar_core::{
    CoreError, Money, PaymentMethod, PaymentStatus, TaxConfig, Transaction, TransactionItem,
};
use bazaar_db::{Database, DeltaOutcome};

use crate::error::LedgerResult;

// =============================================================================
// Inputs
// =============================================================================

/// One line of a sale posting.
#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub product_id: String,
    pub quantity: i64,
    /// Per-unit discount in paisa.
    pub discount_paisa: i64,
}

/// Input for posting a sale.
#[derive(Debug, Clone)]
pub struct NewSale {
    /// Business date of the sale. Defaults to now.
    pub date: Option<DateTime<Utc>>,
    /// Acting user (external identity provider).
    pub operator: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<NewSaleItem>,
    /// Order-level discount in paisa.
    pub order_discount_paisa: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

/// Service for posting and reading sales.
#[derive(Debug, Clone)]
pub struct SalesService {
    db: Database,
}

impl SalesService {
    /// Creates a new SalesService.
    pub fn new(db: Database) -> Self {
        SalesService { db }
    }

    /// Posts a sale.
    ///
    /// ## Steps
    /// 1. Validate: at least one item, positive quantities, non-negative
    ///    discounts
    /// 2. Resolve each product and snapshot its name, unit and price
    /// 3. Compute totals (`total = subtotal + tax - discount`)
    /// 4. Insert header and items atomically
    /// 5. Decrement inventory per line (non-fatal, see module docs)
    pub async fn post_sale(
        &self,
        input: NewSale,
        tax_config: &TaxConfig,
    ) -> LedgerResult<Transaction> {
        if input.items.is_empty() {
            return Err(CoreError::EmptySale.into());
        }
        validate_price_paisa(input.order_discount_paisa).map_err(CoreError::from)?;
        for item in &input.items {
            validate_uuid(&item.product_id).map_err(CoreError::from)?;
            validate_quantity(item.quantity).map_err(CoreError::from)?;
            validate_price_paisa(item.discount_paisa).map_err(CoreError::from)?;
        }

        // Snapshot pass: freeze name, unit and price per line before any math.
        let mut lines = Vec::with_capacity(input.items.len());
        let mut items = Vec::with_capacity(input.items.len());
        let transaction_id = Uuid::new_v4().to_string();

        for (position, item) in input.items.iter().enumerate() {
            let product = self
                .db
                .products()
                .get_by_id(&item.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;

            let line = SaleLine::new(
                item.quantity,
                product.price(),
                Money::from_paisa(item.discount_paisa),
            );
            lines.push(line);

            items.push(TransactionItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction_id.clone(),
                product_id: product.id,
                name_snapshot: product.name,
                unit: product.unit,
                quantity: item.quantity,
                unit_price_paisa: product.price_paisa,
                discount_paisa: item.discount_paisa,
                line_total_paisa: line.line_total().paisa(),
                position: position as i64,
            });
        }

        let totals = compute_totals(&lines, Money::from_paisa(input.order_discount_paisa), tax_config);

        let now = Utc::now();
        let sale = Transaction {
            id: transaction_id,
            date: input.date.unwrap_or(now),
            operator: input.operator,
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_email: input.customer_email,
            subtotal_paisa: totals.subtotal.paisa(),
            discount_paisa: totals.discount.paisa(),
            tax_paisa: totals.tax.paisa(),
            total_paisa: totals.total.paisa(),
            payment_method: input.payment_method,
            payment_status: input.payment_status,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        self.db.sales().insert_sale(&sale, &items).await?;

        // Inventory pass. Failures here never unwind the posted sale.
        for item in &items {
            match self
                .db
                .products()
                .apply_inventory_delta(&item.product_id, -item.quantity)
                .await
            {
                Ok(DeltaOutcome::Applied { .. }) => {}
                Ok(DeltaOutcome::Insufficient { available }) => {
                    warn!(
                        sale_id = %sale.id,
                        product_id = %item.product_id,
                        requested = %item.quantity,
                        available = %available,
                        "Sale line exceeds on-hand quantity; inventory left unchanged"
                    );
                }
                Err(err) => {
                    warn!(
                        sale_id = %sale.id,
                        product_id = %item.product_id,
                        error = %err,
                        "Inventory decrement failed for sale line"
                    );
                }
            }
        }

        info!(
            id = %sale.id,
            items = items.len(),
            total_paisa = %sale.total_paisa,
            "Sale posted"
        );

        Ok(sale)
    }

    /// Gets a sale with its items in posted order.
    pub async fn get_sale(&self, id: &str) -> LedgerResult<(Transaction, Vec<TransactionItem>)> {
        let sale = self
            .db
            .sales()
            .get_by_id(id)
            .await?
            .ok_or_else(|| bazaar_db::DbError::not_found("Transaction", id))?;

        let items = self.db.sales().get_items(id).await?;

        Ok((sale, items))
    }

    /// Lists sale headers newest first.
    pub async fn list_recent(&self, limit: i64, offset: i64) -> LedgerResult<Vec<Transaction>> {
        Ok(self.db.sales().list_recent(limit, offset).await?)
    }

    /// Total sale count.
    pub async fn count(&self) -> LedgerResult<i64> {
        Ok(self.db.sales().count().await?)
    }
}
