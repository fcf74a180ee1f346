//! Quick audit battery
//!
//! Each rule runs independently and reports its own pass/fail with
//! details; no rule short-circuits the others. The commission identities
//! checked here are exact by construction (the platform fee is derived by
//! subtraction), so any violation means stored data was corrupted or
//! written by something other than the settlement engine.

use crate::store::{MarketStorage, StorageResult};
use shared::order::{Order, OrderStatus, PaymentMethod};
use shared::wallet::{TransactionType, WalletTransaction};

use super::types::{AuditCheck, AuditReport};

/// Run the full check battery against storage (read-only)
pub fn run_quick_audit(storage: &MarketStorage) -> StorageResult<AuditReport> {
    let orders = storage.all_orders()?;
    let payment_count = storage.count_payments()?;
    let transactions = storage.all_transactions()?;
    let now = chrono::Utc::now().timestamp_millis();

    Ok(build_report(&orders, payment_count, &transactions, now))
}

/// Pure report assembly over already-loaded data
pub fn build_report(
    orders: &[Order],
    payment_count: u64,
    transactions: &[WalletTransaction],
    timestamp: i64,
) -> AuditReport {
    let checks = vec![
        check_orders_exist(orders),
        check_payments_match_orders(orders, payment_count),
        check_settled_orders_have_entries(orders, transactions),
        check_commission_partitions_subtotal(orders),
        check_delivered_totals_reconcile(orders),
        check_ledger_matches_order_earnings(orders, transactions),
    ];
    AuditReport::from_checks(checks, timestamp)
}

fn delivered(orders: &[Order]) -> impl Iterator<Item = &Order> {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Delivered && o.is_settled())
}

fn check_orders_exist(orders: &[Order]) -> AuditCheck {
    AuditCheck::new(
        "orders_exist",
        !orders.is_empty(),
        format!("{} orders stored", orders.len()),
    )
}

fn check_payments_match_orders(orders: &[Order], payment_count: u64) -> AuditCheck {
    let order_count = orders.len() as u64;
    AuditCheck::new(
        "payments_match_orders",
        payment_count == order_count,
        format!("{} payment records for {} orders", payment_count, order_count),
    )
}

fn check_settled_orders_have_entries(
    orders: &[Order],
    transactions: &[WalletTransaction],
) -> AuditCheck {
    let settled = delivered(orders).count();
    if settled == 0 {
        return AuditCheck::new(
            "settled_orders_have_entries",
            true,
            "no settled orders yet",
        );
    }
    AuditCheck::new(
        "settled_orders_have_entries",
        !transactions.is_empty(),
        format!(
            "{} settled orders, {} ledger entries",
            settled,
            transactions.len()
        ),
    )
}

/// `platform_fee + business_earnings == subtotal`, exactly, per order
fn check_commission_partitions_subtotal(orders: &[Order]) -> AuditCheck {
    let violations: Vec<&str> = delivered(orders)
        .filter(|o| {
            o.platform_fee.unwrap_or(0) + o.business_earnings.unwrap_or(0) != o.subtotal
        })
        .map(|o| o.short_id())
        .collect();
    AuditCheck::new(
        "commission_partitions_subtotal",
        violations.is_empty(),
        if violations.is_empty() {
            "platform fee + business earnings equals subtotal on every delivered order".to_string()
        } else {
            format!("violated by orders: {}", violations.join(", "))
        },
    )
}

/// `platform_fee + business_earnings + delivery_fee == total`, exactly
///
/// Note the driver's commission is NOT a term here: it is a share of the
/// total, disjoint from the delivery fee, so summing it in would only
/// balance when `delivery_fee == round(0.15 * total)` by coincidence.
fn check_delivered_totals_reconcile(orders: &[Order]) -> AuditCheck {
    let violations: Vec<&str> = delivered(orders)
        .filter(|o| {
            o.platform_fee.unwrap_or(0) + o.business_earnings.unwrap_or(0) + o.delivery_fee
                != o.total
        })
        .map(|o| o.short_id())
        .collect();
    AuditCheck::new(
        "delivered_totals_reconcile",
        violations.is_empty(),
        if violations.is_empty() {
            "fee partition + delivery fee equals total on every delivered order".to_string()
        } else {
            format!("violated by orders: {}", violations.join(", "))
        },
    )
}

/// Ledger entries and order earnings fields must agree per delivered order
fn check_ledger_matches_order_earnings(
    orders: &[Order],
    transactions: &[WalletTransaction],
) -> AuditCheck {
    let mut violations: Vec<String> = Vec::new();

    for order in delivered(orders) {
        let for_order = |user: &str, pred: fn(&WalletTransaction) -> bool| -> i64 {
            transactions
                .iter()
                .filter(|t| t.order_id.as_deref() == Some(order.id.as_str()))
                .filter(|t| t.user_id == user)
                .filter(|t| pred(t))
                .map(|t| t.amount)
                .sum()
        };

        let business_credited = for_order(&order.business_id, |t| t.tx_type.is_income());
        if business_credited != order.business_earnings.unwrap_or(0) {
            violations.push(format!(
                "{}: business credited {} vs earnings {}",
                order.short_id(),
                business_credited,
                order.business_earnings.unwrap_or(0)
            ));
        }

        if let Some(driver_id) = &order.delivery_person_id {
            let driver_credited = for_order(driver_id, |t| t.tx_type.is_income());
            if driver_credited != order.delivery_earnings.unwrap_or(0) {
                violations.push(format!(
                    "{}: driver credited {} vs earnings {}",
                    order.short_id(),
                    driver_credited,
                    order.delivery_earnings.unwrap_or(0)
                ));
            }

            if order.payment_method == PaymentMethod::Cash {
                let debt = for_order(driver_id, |t| t.tx_type == TransactionType::CashDebt);
                let expected = order.total - order.delivery_earnings.unwrap_or(0);
                if debt != expected {
                    violations.push(format!(
                        "{}: cash debt {} vs expected {}",
                        order.short_id(),
                        debt,
                        expected
                    ));
                }
            }
        }
    }

    AuditCheck::new(
        "ledger_matches_order_earnings",
        violations.is_empty(),
        if violations.is_empty() {
            "ledger entries agree with order earnings fields".to_string()
        } else {
            violations.join("; ")
        },
    )
}
