//! Commission calculation
//!
//! All inputs and outputs are integer cents; `Decimal` is used only for
//! the ratio math in between, rounded half-up. The platform fee is derived
//! by subtraction rather than rounded independently, so
//! `business_earnings + platform_fee == subtotal` holds exactly - no
//! residual-cent drift.

use rust_decimal::prelude::*;
use shared::order::{Order, PaymentMethod};

/// Platform markup rate baked into the customer-facing subtotal (15%)
pub const MARKUP_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Round a decimal amount to whole cents, half-up
#[inline]
fn round_cents(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        // i64 cents through a 15% ratio can never leave Decimal's range
        .expect("rounded cent amount fits in i64")
}

/// Settlement amounts for one order, all in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementBreakdown {
    /// Platform commission recovered from the subtotal markup
    pub platform_fee: i64,
    /// Pre-markup product price owed to the business
    pub business_earnings: i64,
    /// Driver commission, computed from the order TOTAL
    pub delivery_earnings: i64,
    /// Cash collected beyond the driver's commission (zero for card)
    pub cash_owed: i64,
}

/// Compute the settlement split for an order
///
/// The stored subtotal already includes the markup
/// (`subtotal = product_base * (1 + MARKUP_RATE)`), so the business payout
/// recovers the pre-markup price and the platform keeps the difference.
///
/// The driver commission is a share of `total`, NOT of the delivery fee.
/// This rule is easy to miscode against `delivery_fee`; the tests pin the
/// formula.
pub fn compute_settlement(order: &Order) -> SettlementBreakdown {
    let subtotal = Decimal::from(order.subtotal);
    let total = Decimal::from(order.total);

    let business_earnings = round_cents(subtotal / (Decimal::ONE + MARKUP_RATE));
    let platform_fee = order.subtotal - business_earnings;

    let delivery_earnings = round_cents(total * MARKUP_RATE);

    // Cash orders: the driver collects the full total at the door, keeps
    // their commission, and owes the remainder back
    let cash_owed = match order.payment_method {
        PaymentMethod::Cash => order.total - delivery_earnings,
        PaymentMethod::Card => 0,
    };

    SettlementBreakdown {
        platform_fee,
        business_earnings,
        delivery_earnings,
        cash_owed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;

    fn order_with(subtotal: i64, delivery_fee: i64, method: PaymentMethod) -> Order {
        Order {
            id: "order-1".to_string(),
            customer_id: "cust-1".to_string(),
            business_id: "biz-1".to_string(),
            delivery_person_id: Some("driver-1".to_string()),
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            platform_fee: None,
            business_earnings: None,
            delivery_earnings: None,
            payment_method: method,
            status: OrderStatus::OnTheWay,
            created_at: 0,
            delivered_at: None,
        }
    }

    #[test]
    fn test_business_earnings_recover_pre_markup_price() {
        // 12000 with 15% markup baked in: 12000 / 1.15 = 10434.78 -> 10435
        let split = compute_settlement(&order_with(12000, 2500, PaymentMethod::Card));
        assert_eq!(split.business_earnings, 10435);
        assert_eq!(split.platform_fee, 1565);
    }

    #[test]
    fn test_driver_commission_uses_total_not_delivery_fee() {
        // total = 14500, commission = round(14500 * 0.15) = 2175
        let split = compute_settlement(&order_with(12000, 2500, PaymentMethod::Card));
        assert_eq!(split.delivery_earnings, 2175);
        // Pin the distinction: 15% of the fee alone would be 375
        assert_ne!(split.delivery_earnings, 375);
    }

    #[test]
    fn test_cash_order_tracks_debt() {
        let split = compute_settlement(&order_with(12000, 2500, PaymentMethod::Cash));
        assert_eq!(split.delivery_earnings, 2175);
        assert_eq!(split.cash_owed, 14500 - 2175);
        assert_eq!(split.cash_owed, 12325);
    }

    #[test]
    fn test_card_order_has_no_debt() {
        let split = compute_settlement(&order_with(12000, 2500, PaymentMethod::Card));
        assert_eq!(split.cash_owed, 0);
    }

    #[test]
    fn test_additivity_is_exact_across_subtotals() {
        // platform_fee is a subtraction, so the partition of the subtotal
        // is exact for every amount, awkward remainders included
        for subtotal in [1, 7, 99, 100, 101, 115, 1150, 9999, 12000, 123457] {
            let split = compute_settlement(&order_with(subtotal, 500, PaymentMethod::Card));
            assert_eq!(
                split.business_earnings + split.platform_fee,
                subtotal,
                "drift at subtotal {}",
                subtotal
            );
        }
    }

    #[test]
    fn test_rounding_is_half_up() {
        // 1150 / 1.15 = 1000 exactly
        let split = compute_settlement(&order_with(1150, 0, PaymentMethod::Card));
        assert_eq!(split.business_earnings, 1000);
        assert_eq!(split.platform_fee, 150);

        // total = 10: 10 * 0.15 = 1.5 -> rounds up to 2
        let split = compute_settlement(&order_with(10, 0, PaymentMethod::Card));
        assert_eq!(split.delivery_earnings, 2);
    }

    #[test]
    fn test_zero_subtotal() {
        let split = compute_settlement(&order_with(0, 500, PaymentMethod::Cash));
        assert_eq!(split.business_earnings, 0);
        assert_eq!(split.platform_fee, 0);
        // Commission on the fee-only total, debt on the remainder
        assert_eq!(split.delivery_earnings, 75);
        assert_eq!(split.cash_owed, 425);
    }
}
