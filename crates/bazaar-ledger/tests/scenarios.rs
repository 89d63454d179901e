//! End-to-end posting scenarios over an in-memory database.
//!
//! Each test opens a fresh database, runs real postings through the service
//! layer and asserts on what the ledger and read models show afterwards.

use chrono::{Duration, Utc};
use uuid::Uuid;

use bazaar_core::{
    AdjustmentKind, AdjustmentReason, CoreError, Merchant, PaymentMethod, PaymentStatus,
    PayoutMethod, PayoutStatus, Product, TaxConfig, Unit,
};
use bazaar_db::{Database, DbConfig};
use bazaar_ledger::{Ledger, LedgerError, NewAdjustment, NewPayout, NewSale, NewSaleItem, PayoutPatch};

// =============================================================================
// Fixtures
// =============================================================================

async fn ledger() -> Ledger {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Ledger::new(db)
}

fn product(name: &str, category: &str, price_paisa: i64, quantity: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        sku: format!("SKU-{}", name.to_uppercase()),
        name: name.to_string(),
        category: category.to_string(),
        unit: Unit::Kg,
        price_paisa,
        inventory_quantity: quantity,
        shelf_life_days: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn merchant(name: &str, balance_paisa: i64) -> Merchant {
    let now = Utc::now();
    Merchant {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        contact_person: "Asha".to_string(),
        phone: "9800000000".to_string(),
        email: None,
        bank_account_name: None,
        bank_account_number: None,
        bank_name: None,
        bank_ifsc_code: None,
        current_balance_paisa: balance_paisa,
        created_at: now,
        updated_at: now,
    }
}

fn adjustment(product_id: &str, kind: AdjustmentKind, quantity: i64, reason: AdjustmentReason) -> NewAdjustment {
    NewAdjustment {
        product_id: product_id.to_string(),
        kind,
        quantity,
        reason,
        notes: None,
        created_by: "tester".to_string(),
    }
}

fn simple_sale(product_id: &str, quantity: i64) -> NewSale {
    NewSale {
        date: None,
        operator: "tester".to_string(),
        customer_name: None,
        customer_phone: None,
        customer_email: None,
        items: vec![NewSaleItem {
            product_id: product_id.to_string(),
            quantity,
            discount_paisa: 0,
        }],
        order_discount_paisa: 0,
        payment_method: PaymentMethod::Cash,
        payment_status: PaymentStatus::Paid,
        notes: None,
    }
}

fn completed_payout(merchant_id: &str, amount_paisa: i64) -> NewPayout {
    NewPayout {
        merchant_id: merchant_id.to_string(),
        amount_paisa,
        date: None,
        method: PayoutMethod::BankTransfer,
        reference_number: None,
        notes: None,
        status: Some(PayoutStatus::Completed),
        created_by: "tester".to_string(),
    }
}

async fn balance_of(ledger: &Ledger, merchant_id: &str) -> i64 {
    ledger
        .db()
        .merchants()
        .get_by_id(merchant_id)
        .await
        .unwrap()
        .unwrap()
        .current_balance_paisa
}

async fn quantity_of(ledger: &Ledger, product_id: &str) -> i64 {
    ledger
        .db()
        .products()
        .get_by_id(product_id)
        .await
        .unwrap()
        .unwrap()
        .inventory_quantity
}

// =============================================================================
// Stock Adjustments
// =============================================================================

#[tokio::test]
async fn adjustment_addition_raises_stock_and_writes_audit_row() {
    let ledger = ledger().await;
    let p = product("tomato", "vegetable", 5000, 10);
    ledger.db().products().insert(&p).await.unwrap();

    let posted = ledger
        .inventory()
        .post_adjustment(adjustment(&p.id, AdjustmentKind::Addition, 25, AdjustmentReason::Purchase))
        .await
        .unwrap();

    assert_eq!(quantity_of(&ledger, &p.id).await, 35);
    // Unit snapshot comes from the product at posting time.
    assert_eq!(posted.unit, Unit::Kg);
    assert_eq!(posted.signed_delta(), 25);

    let history = ledger.inventory().history(Some(&p.id), 50, 0).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, posted.id);
}

#[tokio::test]
async fn reduction_below_zero_is_rejected_without_audit_row() {
    let ledger = ledger().await;
    let p = product("okra", "vegetable", 4000, 10);
    ledger.db().products().insert(&p).await.unwrap();

    // First reduction fits.
    ledger
        .inventory()
        .post_adjustment(adjustment(&p.id, AdjustmentKind::Reduction, 7, AdjustmentReason::Damaged))
        .await
        .unwrap();
    assert_eq!(quantity_of(&ledger, &p.id).await, 3);

    // Second identical reduction would go to -4: rejected, nothing changes.
    let err = ledger
        .inventory()
        .post_adjustment(adjustment(&p.id, AdjustmentKind::Reduction, 7, AdjustmentReason::Damaged))
        .await
        .unwrap_err();

    match err {
        LedgerError::Core(CoreError::InsufficientInventory {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 3);
            assert_eq!(requested, 7);
        }
        other => panic!("expected InsufficientInventory, got {other}"),
    }

    assert_eq!(quantity_of(&ledger, &p.id).await, 3);
    // Only the successful posting left an audit row.
    assert_eq!(ledger.inventory().history_count(Some(&p.id)).await.unwrap(), 1);
}

#[tokio::test]
async fn adjustment_for_unknown_product_fails() {
    let ledger = ledger().await;
    let ghost = Uuid::new_v4().to_string();

    let err = ledger
        .inventory()
        .post_adjustment(adjustment(&ghost, AdjustmentKind::Addition, 5, AdjustmentReason::Purchase))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Core(CoreError::ProductNotFound(_))));
}

#[tokio::test]
async fn zero_quantity_adjustment_is_invalid() {
    let ledger = ledger().await;
    let p = product("chili", "vegetable", 2000, 5);
    ledger.db().products().insert(&p).await.unwrap();

    let err = ledger
        .inventory()
        .post_adjustment(adjustment(&p.id, AdjustmentKind::Addition, 0, AdjustmentReason::Correction))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));
    assert_eq!(ledger.inventory().history_count(None).await.unwrap(), 0);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn sale_math_with_default_tax() {
    let ledger = ledger().await;
    let p = product("mango", "fruit", 5000, 100);
    ledger.db().products().insert(&p).await.unwrap();

    // 3 kg at Rs 50.00 with 5% GST after discount, no discounts.
    let sale = ledger
        .sales()
        .post_sale(simple_sale(&p.id, 3), &TaxConfig::default())
        .await
        .unwrap();

    assert_eq!(sale.subtotal_paisa, 15_000);
    assert_eq!(sale.tax_paisa, 750);
    assert_eq!(sale.total_paisa, 15_750);
    assert_eq!(
        sale.total_paisa,
        sale.subtotal_paisa + sale.tax_paisa - sale.discount_paisa
    );

    assert_eq!(quantity_of(&ledger, &p.id).await, 97);

    let (header, items) = ledger.sales().get_sale(&sale.id).await.unwrap();
    assert_eq!(header.id, sale.id);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name_snapshot, "mango");
    assert_eq!(items[0].unit_price_paisa, 5000);
    assert_eq!(items[0].line_total_paisa, 15_000);
}

#[tokio::test]
async fn sale_items_keep_posted_order() {
    let ledger = ledger().await;
    let a = product("apple", "fruit", 3000, 50);
    let b = product("banana", "fruit", 1000, 50);
    let c = product("cherry", "fruit", 9000, 50);
    for p in [&a, &b, &c] {
        ledger.db().products().insert(p).await.unwrap();
    }

    let input = NewSale {
        items: vec![
            NewSaleItem { product_id: c.id.clone(), quantity: 1, discount_paisa: 0 },
            NewSaleItem { product_id: a.id.clone(), quantity: 2, discount_paisa: 0 },
            NewSaleItem { product_id: b.id.clone(), quantity: 3, discount_paisa: 0 },
        ],
        ..simple_sale(&a.id, 1)
    };

    let sale = ledger
        .sales()
        .post_sale(input, &TaxConfig::disabled())
        .await
        .unwrap();

    let (_, items) = ledger.sales().get_sale(&sale.id).await.unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name_snapshot.as_str()).collect();
    assert_eq!(names, ["cherry", "apple", "banana"]);
    assert_eq!(items[0].position, 0);
    assert_eq!(items[2].position, 2);
}

#[tokio::test]
async fn oversold_line_leaves_inventory_unchanged_but_sale_stands() {
    let ledger = ledger().await;
    let p = product("papaya", "fruit", 8000, 1);
    ledger.db().products().insert(&p).await.unwrap();

    let sale = ledger
        .sales()
        .post_sale(simple_sale(&p.id, 3), &TaxConfig::disabled())
        .await
        .unwrap();

    // Sale posted with full financials.
    assert_eq!(sale.total_paisa, 24_000);
    assert!(ledger.sales().get_sale(&sale.id).await.is_ok());

    // On-hand never went negative; the failed decrement changed nothing.
    assert_eq!(quantity_of(&ledger, &p.id).await, 1);
}

#[tokio::test]
async fn empty_sale_is_rejected() {
    let ledger = ledger().await;

    let input = NewSale {
        items: Vec::new(),
        ..simple_sale(&Uuid::new_v4().to_string(), 1)
    };

    let err = ledger
        .sales()
        .post_sale(input, &TaxConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Core(CoreError::EmptySale)));
    assert_eq!(ledger.sales().count().await.unwrap(), 0);
}

#[tokio::test]
async fn sale_with_unknown_product_posts_nothing() {
    let ledger = ledger().await;
    let ghost = Uuid::new_v4().to_string();

    let err = ledger
        .sales()
        .post_sale(simple_sale(&ghost, 2), &TaxConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Core(CoreError::ProductNotFound(_))));
    assert_eq!(ledger.sales().count().await.unwrap(), 0);
}

#[tokio::test]
async fn bulk_quantity_sale_posts_without_a_cap() {
    let ledger = ledger().await;
    let p = product("wheat", "grain", 200, 5000);
    ledger.db().products().insert(&p).await.unwrap();

    // Line quantities are only required to be positive; a wholesale-sized
    // order of 1000 units posts like any other sale.
    let sale = ledger
        .sales()
        .post_sale(simple_sale(&p.id, 1000), &TaxConfig::disabled())
        .await
        .unwrap();

    assert_eq!(sale.subtotal_paisa, 200_000);
    assert_eq!(quantity_of(&ledger, &p.id).await, 4000);
}

#[tokio::test]
async fn sale_with_order_and_line_discounts() {
    let ledger = ledger().await;
    let p = product("grapes", "fruit", 4000, 20);
    ledger.db().products().insert(&p).await.unwrap();

    // 2 x (40.00 - 5.00) = 70.00; order discount 10.00; 5% on 60.00 = 3.00
    let input = NewSale {
        items: vec![NewSaleItem {
            product_id: p.id.clone(),
            quantity: 2,
            discount_paisa: 500,
        }],
        order_discount_paisa: 1000,
        ..simple_sale(&p.id, 1)
    };

    let sale = ledger
        .sales()
        .post_sale(input, &TaxConfig::default())
        .await
        .unwrap();

    assert_eq!(sale.subtotal_paisa, 7000);
    assert_eq!(sale.discount_paisa, 1000);
    assert_eq!(sale.tax_paisa, 300);
    assert_eq!(sale.total_paisa, 6300);
}

// =============================================================================
// Payouts and Merchant Balances
// =============================================================================

#[tokio::test]
async fn completed_payout_settles_balance_on_creation() {
    let ledger = ledger().await;
    let m = merchant("Fresh Farms", 100_000);
    ledger.db().merchants().insert(&m).await.unwrap();

    ledger
        .payouts()
        .create_payout(completed_payout(&m.id, 20_000))
        .await
        .unwrap();

    assert_eq!(balance_of(&ledger, &m.id).await, 80_000);
}

#[tokio::test]
async fn pending_payout_touches_no_balance_until_completed() {
    let ledger = ledger().await;
    let m = merchant("Green Valley", 100_000);
    ledger.db().merchants().insert(&m).await.unwrap();

    let payout = ledger
        .payouts()
        .create_payout(NewPayout {
            status: Some(PayoutStatus::Pending),
            ..completed_payout(&m.id, 20_000)
        })
        .await
        .unwrap();

    assert_eq!(balance_of(&ledger, &m.id).await, 100_000);

    // Completing it settles.
    ledger
        .payouts()
        .update_payout(
            &payout.id,
            PayoutPatch {
                status: Some(PayoutStatus::Completed),
                ..PayoutPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&ledger, &m.id).await, 80_000);

    // Failing it afterwards reinstates.
    ledger
        .payouts()
        .update_payout(
            &payout.id,
            PayoutPatch {
                status: Some(PayoutStatus::Failed),
                ..PayoutPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&ledger, &m.id).await, 100_000);
}

#[tokio::test]
async fn field_edit_without_boundary_crossing_fires_no_delta() {
    let ledger = ledger().await;
    let m = merchant("Sunrise Traders", 100_000);
    ledger.db().merchants().insert(&m).await.unwrap();

    let payout = ledger
        .payouts()
        .create_payout(completed_payout(&m.id, 20_000))
        .await
        .unwrap();
    assert_eq!(balance_of(&ledger, &m.id).await, 80_000);

    // Amount edit while staying completed: no balance movement.
    let updated = ledger
        .payouts()
        .update_payout(
            &payout.id,
            PayoutPatch {
                amount_paisa: Some(30_000),
                notes: Some(Some("corrected amount".to_string())),
                ..PayoutPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.amount_paisa, 30_000);
    assert_eq!(balance_of(&ledger, &m.id).await, 80_000);
}

#[tokio::test]
async fn reinstate_uses_current_amount() {
    let ledger = ledger().await;
    let m = merchant("Hilltop Produce", 100_000);
    ledger.db().merchants().insert(&m).await.unwrap();

    let payout = ledger
        .payouts()
        .create_payout(completed_payout(&m.id, 20_000))
        .await
        .unwrap();
    assert_eq!(balance_of(&ledger, &m.id).await, 80_000);

    // Raise the amount while completed, then fail it: the reinstatement uses
    // the amount as of the failing patch.
    ledger
        .payouts()
        .update_payout(
            &payout.id,
            PayoutPatch {
                amount_paisa: Some(30_000),
                ..PayoutPatch::default()
            },
        )
        .await
        .unwrap();

    ledger
        .payouts()
        .update_payout(
            &payout.id,
            PayoutPatch {
                status: Some(PayoutStatus::Failed),
                ..PayoutPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(balance_of(&ledger, &m.id).await, 110_000);
}

#[tokio::test]
async fn pending_failed_shuffle_never_moves_balance() {
    let ledger = ledger().await;
    let m = merchant("Riverbend", 50_000);
    ledger.db().merchants().insert(&m).await.unwrap();

    let payout = ledger
        .payouts()
        .create_payout(NewPayout {
            status: Some(PayoutStatus::Pending),
            ..completed_payout(&m.id, 10_000)
        })
        .await
        .unwrap();

    for status in [PayoutStatus::Failed, PayoutStatus::Pending, PayoutStatus::Failed] {
        ledger
            .payouts()
            .update_payout(
                &payout.id,
                PayoutPatch {
                    status: Some(status),
                    ..PayoutPatch::default()
                },
            )
            .await
            .unwrap();
    }

    assert_eq!(balance_of(&ledger, &m.id).await, 50_000);
}

#[tokio::test]
async fn deleting_completed_payout_restores_balance() {
    let ledger = ledger().await;
    let m = merchant("Lakeside Dairy", 100_000);
    ledger.db().merchants().insert(&m).await.unwrap();

    let payout = ledger
        .payouts()
        .create_payout(completed_payout(&m.id, 20_000))
        .await
        .unwrap();
    assert_eq!(balance_of(&ledger, &m.id).await, 80_000);

    ledger.payouts().delete_payout(&payout.id).await.unwrap();
    assert_eq!(balance_of(&ledger, &m.id).await, 100_000);

    let err = ledger.payouts().get_payout(&payout.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::Core(CoreError::PayoutNotFound(_))));
}

#[tokio::test]
async fn deleting_pending_payout_leaves_balance_alone() {
    let ledger = ledger().await;
    let m = merchant("Orchard Lane", 40_000);
    ledger.db().merchants().insert(&m).await.unwrap();

    let payout = ledger
        .payouts()
        .create_payout(NewPayout {
            status: Some(PayoutStatus::Pending),
            ..completed_payout(&m.id, 15_000)
        })
        .await
        .unwrap();

    ledger.payouts().delete_payout(&payout.id).await.unwrap();
    assert_eq!(balance_of(&ledger, &m.id).await, 40_000);
}

#[tokio::test]
async fn payout_delete_is_conditional_on_observed_status() {
    let ledger = ledger().await;
    let m = merchant("Cedar Grove", 60_000);
    ledger.db().merchants().insert(&m).await.unwrap();

    let payout = ledger
        .payouts()
        .create_payout(NewPayout {
            status: Some(PayoutStatus::Pending),
            ..completed_payout(&m.id, 10_000)
        })
        .await
        .unwrap();

    // A delete guarded on a stale status matches no row and removes nothing.
    let deleted = ledger
        .db()
        .payouts()
        .delete_if_status(&payout.id, PayoutStatus::Completed)
        .await
        .unwrap();
    assert!(!deleted);
    assert!(ledger.payouts().get_payout(&payout.id).await.is_ok());

    // The service path reads the current status and succeeds.
    ledger.payouts().delete_payout(&payout.id).await.unwrap();
    assert_eq!(balance_of(&ledger, &m.id).await, 60_000);
}

#[tokio::test]
async fn payout_for_unknown_merchant_fails() {
    let ledger = ledger().await;
    let ghost = Uuid::new_v4().to_string();

    let err = ledger
        .payouts()
        .create_payout(completed_payout(&ghost, 5000))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Core(CoreError::MerchantNotFound(_))));
}

#[tokio::test]
async fn payout_list_filters_by_merchant_and_status() {
    let ledger = ledger().await;
    let m1 = merchant("Alpha", 0);
    let m2 = merchant("Beta", 0);
    ledger.db().merchants().insert(&m1).await.unwrap();
    ledger.db().merchants().insert(&m2).await.unwrap();

    ledger.payouts().create_payout(completed_payout(&m1.id, 1000)).await.unwrap();
    ledger
        .payouts()
        .create_payout(NewPayout {
            status: Some(PayoutStatus::Pending),
            ..completed_payout(&m1.id, 2000)
        })
        .await
        .unwrap();
    ledger.payouts().create_payout(completed_payout(&m2.id, 3000)).await.unwrap();

    let all = ledger.payouts().list_payouts(None, None, 50, 0).await.unwrap();
    assert_eq!(all.len(), 3);

    let m1_only = ledger
        .payouts()
        .list_payouts(Some(&m1.id), None, 50, 0)
        .await
        .unwrap();
    assert_eq!(m1_only.len(), 2);

    let m1_pending = ledger
        .payouts()
        .list_payouts(Some(&m1.id), Some(PayoutStatus::Pending), 50, 0)
        .await
        .unwrap();
    assert_eq!(m1_pending.len(), 1);
    assert_eq!(m1_pending[0].amount_paisa, 2000);
}

// =============================================================================
// Read Models
// =============================================================================

#[tokio::test]
async fn low_stock_lists_emptiest_first() {
    let ledger = ledger().await;
    let low = product("lettuce", "vegetable", 2500, 2);
    let mid = product("spinach", "vegetable", 2000, 5);
    let high = product("potato", "vegetable", 1500, 50);
    for p in [&low, &mid, &high] {
        ledger.db().products().insert(p).await.unwrap();
    }

    let listed = ledger.reports().low_stock().await.unwrap();
    let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["lettuce", "spinach"]);
}

#[tokio::test]
async fn expiring_soon_includes_expired_and_sorts_by_days_left() {
    let ledger = ledger().await;
    let now = Utc::now();

    let mut soon = product("milk", "dairy", 6000, 10);
    soon.shelf_life_days = Some(5);
    soon.created_at = now - Duration::days(3); // 2 days left

    let mut expired = product("curd", "dairy", 4000, 4);
    expired.shelf_life_days = Some(2);
    expired.created_at = now - Duration::days(4); // expired 2 days ago

    let mut fine = product("ghee", "dairy", 50_000, 8);
    fine.shelf_life_days = Some(180);
    fine.created_at = now;

    for p in [&soon, &expired, &fine] {
        ledger.db().products().insert(p).await.unwrap();
    }

    let expiring = ledger.reports().expiring_soon().await.unwrap();
    assert_eq!(expiring.len(), 2);
    assert_eq!(expiring[0].product.name, "curd");
    assert!(expiring[0].days_left < 0);
    assert_eq!(expiring[1].product.name, "milk");
    assert_eq!(expiring[1].days_left, 2);
}

#[tokio::test]
async fn turnover_report_combines_sales_and_adjustments() {
    let ledger = ledger().await;
    let p = product("onion", "vegetable", 3000, 30);
    ledger.db().products().insert(&p).await.unwrap();

    // Receive 30, sell 40, waste 10: ends at current stock 10.
    ledger
        .inventory()
        .post_adjustment(adjustment(&p.id, AdjustmentKind::Addition, 30, AdjustmentReason::Purchase))
        .await
        .unwrap();
    ledger
        .sales()
        .post_sale(simple_sale(&p.id, 40), &TaxConfig::disabled())
        .await
        .unwrap();
    ledger
        .inventory()
        .post_adjustment(adjustment(&p.id, AdjustmentKind::Reduction, 10, AdjustmentReason::Damaged))
        .await
        .unwrap();

    let report = ledger.reports().inventory_turnover().await.unwrap();
    assert_eq!(report.products.len(), 1);

    let entry = &report.products[0];
    assert_eq!(entry.current_stock, 10);
    assert_eq!(entry.sold, 40);
    assert_eq!(entry.received, 30);
    assert_eq!(entry.wasted, 10);
    // rate = sold / ((current + received) / 2) = 40 / 20
    assert!((entry.turnover_rate - 2.0).abs() < f64::EPSILON);

    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].category, "vegetable");
}

#[tokio::test]
async fn inventory_stats_counts_match_read_models() {
    let ledger = ledger().await;
    let now = Utc::now();

    let low = product("basil", "herb", 1000, 3);
    let mut expiring = product("paneer", "dairy", 30_000, 12);
    expiring.shelf_life_days = Some(4);
    expiring.created_at = now - Duration::days(2);
    let plain = product("rice", "grain", 8000, 100);

    for p in [&low, &expiring, &plain] {
        ledger.db().products().insert(p).await.unwrap();
    }

    let stats = ledger.reports().inventory_stats().await.unwrap();
    assert_eq!(stats.total_products, 3);
    assert_eq!(stats.low_stock, 1);
    assert_eq!(stats.expiring_soon, 1);
}
