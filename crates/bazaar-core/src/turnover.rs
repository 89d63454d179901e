//! # Inventory Turnover & Expiry Math
//!
//! Pure computation behind the read-model aggregator. The db layer fetches
//! window rows; everything here is deterministic arithmetic over them.
//!
//! ## Turnover Formula (trailing window)
//! ```text
//! sold              = sum of sale-line quantities for the product
//! received          = sum of addition-type adjustment quantities
//! wasted            = sum of reduction-type adjustments with a waste reason
//!                     (damaged, expired)
//! average_inventory = (current_stock + received) / 2
//! turnover_rate     = sold / average_inventory   (0 when the average is 0)
//! ```
//!
//! The report keeps the top 10 products by rate, and category averages are
//! computed over that top-10 set only. That scoping is deliberate: the
//! category figures answer "which categories dominate the fast movers", not
//! "what is each category's overall turnover".

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AdjustmentKind, AdjustmentReason};

/// Products ranked in the turnover report.
pub const TURNOVER_TOP_N: usize = 10;

// =============================================================================
// Inputs
// =============================================================================

/// Current stock snapshot for one product, as read from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub current_stock: i64,
}

/// Summed adjustment quantities for one (product, kind, reason) group inside
/// the reporting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AdjustmentTotal {
    pub product_id: String,
    pub kind: AdjustmentKind,
    pub reason: AdjustmentReason,
    pub quantity: i64,
}

// =============================================================================
// Outputs
// =============================================================================

/// Per-product turnover figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductTurnover {
    pub id: String,
    pub name: String,
    pub category: String,
    pub current_stock: i64,
    pub sold: i64,
    pub received: i64,
    pub wasted: i64,
    pub turnover_rate: f64,
}

/// Average turnover of one category across the top-ranked products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTurnover {
    pub category: String,
    pub average_turnover: f64,
}

/// The full turnover report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnoverReport {
    /// Top products by turnover rate, descending.
    pub products: Vec<ProductTurnover>,
    /// Category averages over `products`, descending by average.
    pub categories: Vec<CategoryTurnover>,
}

// =============================================================================
// Turnover Computation
// =============================================================================

/// Combines window rows into the turnover report.
///
/// Sale lines and adjustments referencing products absent from `products`
/// (deleted since the window opened) are skipped.
pub fn compute_turnover(
    products: &[StockRow],
    sold: &[(String, i64)],
    adjustments: &[AdjustmentTotal],
) -> TurnoverReport {
    let mut by_product: HashMap<&str, ProductTurnover> = products
        .iter()
        .map(|p| {
            (
                p.id.as_str(),
                ProductTurnover {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    category: p.category.clone(),
                    current_stock: p.current_stock,
                    sold: 0,
                    received: 0,
                    wasted: 0,
                    turnover_rate: 0.0,
                },
            )
        })
        .collect();

    for (product_id, quantity) in sold {
        if let Some(entry) = by_product.get_mut(product_id.as_str()) {
            entry.sold += quantity;
        }
    }

    for adj in adjustments {
        if let Some(entry) = by_product.get_mut(adj.product_id.as_str()) {
            match adj.kind {
                AdjustmentKind::Addition => entry.received += adj.quantity,
                AdjustmentKind::Reduction => {
                    if adj.reason.is_waste() {
                        entry.wasted += adj.quantity;
                    }
                }
            }
        }
    }

    let mut ranked: Vec<ProductTurnover> = by_product
        .into_values()
        .map(|mut entry| {
            let average_inventory = (entry.current_stock + entry.received) as f64 / 2.0;
            entry.turnover_rate = if average_inventory > 0.0 {
                entry.sold as f64 / average_inventory
            } else {
                0.0
            };
            entry
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.turnover_rate
            .partial_cmp(&a.turnover_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(TURNOVER_TOP_N);

    let categories = category_averages(&ranked);

    TurnoverReport {
        products: ranked,
        categories,
    }
}

/// Category averages over the ranked set only.
fn category_averages(ranked: &[ProductTurnover]) -> Vec<CategoryTurnover> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for product in ranked {
        let entry = sums.entry(product.category.as_str()).or_insert((0.0, 0));
        entry.0 += product.turnover_rate;
        entry.1 += 1;
    }

    let mut categories: Vec<CategoryTurnover> = sums
        .into_iter()
        .map(|(category, (total, count))| CategoryTurnover {
            category: category.to_string(),
            average_turnover: total / count as f64,
        })
        .collect();

    categories.sort_by(|a, b| {
        b.average_turnover
            .partial_cmp(&a.average_turnover)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    categories
}

// =============================================================================
// Expiry Math
// =============================================================================

/// Whole days until a product's stock expires, rounded up.
///
/// Negative for stock that is already past its shelf life.
pub fn days_until_expiry(
    created_at: DateTime<Utc>,
    shelf_life_days: i64,
    now: DateTime<Utc>,
) -> i64 {
    let expiry = created_at + Duration::days(shelf_life_days);
    let remaining_secs = (expiry - now).num_seconds();

    // Ceiling division on seconds: a product 1 second from expiry still has
    // "1 day left", one 1 second past has 0.
    let days = remaining_secs.div_euclid(86_400);
    if remaining_secs.rem_euclid(86_400) > 0 {
        days + 1
    } else {
        days
    }
}

/// Whether stock created at `created_at` with the given shelf life expires on
/// or before `now + window_days`. Already-expired stock counts as expiring.
pub fn expires_within(
    created_at: DateTime<Utc>,
    shelf_life_days: i64,
    now: DateTime<Utc>,
    window_days: i64,
) -> bool {
    created_at + Duration::days(shelf_life_days) <= now + Duration::days(window_days)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(id: &str, category: &str, current: i64) -> StockRow {
        StockRow {
            id: id.to_string(),
            name: id.to_uppercase(),
            category: category.to_string(),
            current_stock: current,
        }
    }

    fn adj(product: &str, kind: AdjustmentKind, reason: AdjustmentReason, qty: i64) -> AdjustmentTotal {
        AdjustmentTotal {
            product_id: product.to_string(),
            kind,
            reason,
            quantity: qty,
        }
    }

    #[test]
    fn test_turnover_rate_formula() {
        // current 10, received 30 -> average 20; sold 40 -> rate 2.0
        let products = [stock("p1", "veg", 10)];
        let sold = [("p1".to_string(), 40)];
        let adjustments = [adj("p1", AdjustmentKind::Addition, AdjustmentReason::Purchase, 30)];

        let report = compute_turnover(&products, &sold, &adjustments);
        let p = &report.products[0];
        assert_eq!(p.sold, 40);
        assert_eq!(p.received, 30);
        assert!((p.turnover_rate - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_average_inventory_gives_zero_rate() {
        let products = [stock("p1", "veg", 0)];
        let sold = [("p1".to_string(), 5)];

        let report = compute_turnover(&products, &sold, &[]);
        assert_eq!(report.products[0].turnover_rate, 0.0);
    }

    #[test]
    fn test_wasted_counts_only_waste_reasons() {
        let products = [stock("p1", "veg", 10)];
        let adjustments = [
            adj("p1", AdjustmentKind::Reduction, AdjustmentReason::Damaged, 2),
            adj("p1", AdjustmentKind::Reduction, AdjustmentReason::Expired, 3),
            adj("p1", AdjustmentKind::Reduction, AdjustmentReason::Theft, 4),
            adj("p1", AdjustmentKind::Reduction, AdjustmentReason::Correction, 1),
        ];

        let report = compute_turnover(&products, &[], &adjustments);
        assert_eq!(report.products[0].wasted, 5);
    }

    #[test]
    fn test_top_ten_truncation_and_order() {
        let mut products = Vec::new();
        let mut sold = Vec::new();
        for i in 0..15 {
            let id = format!("p{i}");
            products.push(stock(&id, "veg", 10));
            // sold grows with i, so p14 has the highest rate
            sold.push((id, i as i64));
        }

        let report = compute_turnover(&products, &sold, &[]);
        assert_eq!(report.products.len(), TURNOVER_TOP_N);
        assert_eq!(report.products[0].id, "p14");
        for pair in report.products.windows(2) {
            assert!(pair[0].turnover_rate >= pair[1].turnover_rate);
        }
    }

    #[test]
    fn test_category_averages_scoped_to_top_ten() {
        // 11 products: ten fast movers in "veg", one slow mover in "fruit".
        // The fruit product falls outside the top 10, so no fruit category
        // average appears at all.
        let mut products = Vec::new();
        let mut sold = Vec::new();
        for i in 0..10 {
            let id = format!("v{i}");
            products.push(stock(&id, "veg", 10));
            sold.push((id, 50));
        }
        products.push(stock("f1", "fruit", 10));
        sold.push(("f1".to_string(), 1));

        let report = compute_turnover(&products, &sold, &[]);
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].category, "veg");
    }

    #[test]
    fn test_unknown_product_rows_skipped() {
        let products = [stock("p1", "veg", 10)];
        let sold = [("ghost".to_string(), 99)];
        let adjustments = [adj("ghost", AdjustmentKind::Addition, AdjustmentReason::Purchase, 7)];

        let report = compute_turnover(&products, &sold, &adjustments);
        assert_eq!(report.products[0].sold, 0);
        assert_eq!(report.products[0].received, 0);
    }

    #[test]
    fn test_days_until_expiry_ceiling() {
        let now = Utc::now();

        // Created 3 days ago with 10-day shelf life: exactly 7 days left.
        let created = now - Duration::days(3);
        assert_eq!(days_until_expiry(created, 10, now), 7);

        // One hour less than 7 full days still rounds up to 7.
        let created = now - Duration::days(3) - Duration::hours(1);
        assert_eq!(days_until_expiry(created, 10, now), 7);

        // Expired 2 days ago.
        let created = now - Duration::days(12);
        assert_eq!(days_until_expiry(created, 10, now), -2);
    }

    #[test]
    fn test_expires_within_window() {
        let now = Utc::now();

        // Expires in exactly 7 days: inside the window.
        assert!(expires_within(now - Duration::days(3), 10, now, 7));
        // Expires in 8 days: outside.
        assert!(!expires_within(now - Duration::days(2), 10, now, 7));
        // Already expired: inside.
        assert!(expires_within(now - Duration::days(20), 10, now, 7));
    }
}
