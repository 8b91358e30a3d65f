//! Order total calculator
//!
//! ```text
//! totalAmount = servicesSum
//!             - totalDiscount - servicesSum * discount% / 100
//!             + totalAddition + servicesSum * addition% / 100
//! ```
//!
//! Percentages are applied to `servicesSum` only and are not clamped here;
//! range checks belong to the form validator.

use rust_decimal::prelude::*;
use serde::Serialize;
use shared::models::ServiceOrder;

use crate::format::round_money;
use crate::ledger::{LedgerTotals, ServiceItemLedger};

/// Inputs of the total formula
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PricingInputs {
    pub services_sum: Decimal,
    pub total_discount: Decimal,
    pub total_addition: Decimal,
    pub discount_percentage: Decimal,
    pub addition_percentage: Decimal,
}

impl PricingInputs {
    pub fn from_totals(
        totals: LedgerTotals,
        discount_percentage: Decimal,
        addition_percentage: Decimal,
    ) -> Self {
        Self {
            services_sum: totals.services_sum,
            total_discount: totals.total_discount,
            total_addition: totals.total_addition,
            discount_percentage,
            addition_percentage,
        }
    }

    /// Pick the sums the form should price.
    ///
    /// While editing a persisted order whose draft list is empty, the
    /// order's last-saved sums are used; otherwise the ledger is the source.
    pub fn resolve(
        ledger: &ServiceItemLedger,
        persisted: Option<&ServiceOrder>,
        discount_percentage: Decimal,
        addition_percentage: Decimal,
    ) -> Self {
        match persisted {
            Some(order) if ledger.is_empty() => Self {
                services_sum: order.services_sum,
                total_discount: order.total_discount,
                total_addition: order.total_addition,
                discount_percentage,
                addition_percentage,
            },
            _ => Self::from_totals(ledger.totals(), discount_percentage, addition_percentage),
        }
    }
}

/// Intermediate amounts for display next to the total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub services_sum: Decimal,
    pub total_discount: Decimal,
    pub total_addition: Decimal,
    /// `servicesSum * discount% / 100`
    pub percentage_discount: Decimal,
    /// `servicesSum * addition% / 100`
    pub percentage_addition: Decimal,
    pub total_amount: Decimal,
}

/// Full calculation with intermediate amounts, all rounded to cents
pub fn calculate(inputs: &PricingInputs) -> PricingBreakdown {
    // Saturating: out-of-range inputs are the validator's job, not a panic
    let percentage_discount = inputs
        .services_sum
        .saturating_mul(inputs.discount_percentage)
        / Decimal::ONE_HUNDRED;
    let percentage_addition = inputs
        .services_sum
        .saturating_mul(inputs.addition_percentage)
        / Decimal::ONE_HUNDRED;

    let total = inputs
        .services_sum
        .saturating_sub(inputs.total_discount)
        .saturating_sub(percentage_discount)
        .saturating_add(inputs.total_addition)
        .saturating_add(percentage_addition);

    PricingBreakdown {
        services_sum: round_money(inputs.services_sum),
        total_discount: round_money(inputs.total_discount),
        total_addition: round_money(inputs.total_addition),
        percentage_discount: round_money(percentage_discount),
        percentage_addition: round_money(percentage_addition),
        total_amount: round_money(total),
    }
}

/// Final amount of an order
pub fn total_amount(inputs: &PricingInputs) -> Decimal {
    calculate(inputs).total_amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ItemDraft;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn inputs(sum: &str, discount: &str, addition: &str, dpct: &str, apct: &str) -> PricingInputs {
        PricingInputs {
            services_sum: dec(sum),
            total_discount: dec(discount),
            total_addition: dec(addition),
            discount_percentage: dec(dpct),
            addition_percentage: dec(apct),
        }
    }

    #[test]
    fn test_ten_percent_discount() {
        assert_eq!(total_amount(&inputs("100", "0", "0", "10", "0")), dec("90"));
    }

    #[test]
    fn test_zero_items_zero_total() {
        assert_eq!(total_amount(&PricingInputs::default()), Decimal::ZERO);
        let ledger = ServiceItemLedger::new();
        let resolved = PricingInputs::resolve(&ledger, None, dec("10"), dec("5"));
        assert_eq!(total_amount(&resolved), Decimal::ZERO);
    }

    #[test]
    fn test_full_formula() {
        // 200 - 10 - 20 + 5 + 10
        let breakdown = calculate(&inputs("200", "10", "5", "10", "5"));
        assert_eq!(breakdown.percentage_discount, dec("20"));
        assert_eq!(breakdown.percentage_addition, dec("10"));
        assert_eq!(breakdown.total_amount, dec("185"));
    }

    #[test]
    fn test_rounds_to_cents() {
        // 33.33 * 15% = 4.9995
        assert_eq!(total_amount(&inputs("33.33", "0", "0", "15", "0")), dec("28.33"));
        // 0.125 rounds away from zero
        assert_eq!(total_amount(&inputs("0.125", "0", "0", "0", "0")), dec("0.13"));
    }

    #[test]
    fn test_percentages_not_clamped() {
        assert_eq!(total_amount(&inputs("100", "0", "0", "150", "0")), dec("-50"));
    }

    #[test]
    fn test_extreme_inputs_do_not_panic() {
        let huge = PricingInputs {
            services_sum: Decimal::MAX,
            total_discount: Decimal::ZERO,
            total_addition: Decimal::MAX,
            discount_percentage: Decimal::ZERO,
            addition_percentage: Decimal::from(1000),
        };
        assert_eq!(total_amount(&huge), Decimal::MAX);

        let negative = PricingInputs {
            total_discount: Decimal::MAX,
            discount_percentage: Decimal::from(1000),
            ..PricingInputs::default()
        };
        assert_eq!(total_amount(&negative), Decimal::MIN);
    }

    #[test]
    fn test_monotonic_in_percentages() {
        let base = inputs("137.45", "12.30", "4.10", "0", "0");
        let mut last_down = total_amount(&base);
        let mut last_up = last_down;
        for pct in (0..=100).step_by(5) {
            let pct = Decimal::from(pct);

            let down = total_amount(&PricingInputs { discount_percentage: pct, ..base });
            assert!(down <= last_down, "discount {pct}% raised the total");
            last_down = down;

            let up = total_amount(&PricingInputs { addition_percentage: pct, ..base });
            assert!(up >= last_up, "addition {pct}% lowered the total");
            last_up = up;
        }
    }

    #[test]
    fn test_resolve_uses_persisted_sums_for_empty_edit() {
        let order: ServiceOrder = serde_json::from_value(serde_json::json!({
            "id": "os-1",
            "orderNumber": 3,
            "customerId": "c-1",
            "equipment": "TV",
            "entryDate": "2024-01-02",
            "servicesSum": "300.00",
            "totalDiscount": "20.00",
            "totalAddition": "0"
        }))
        .unwrap();

        let empty = ServiceItemLedger::new();
        let resolved = PricingInputs::resolve(&empty, Some(&order), dec("10"), Decimal::ZERO);
        assert_eq!(resolved.services_sum, dec("300"));
        assert_eq!(total_amount(&resolved), dec("250"));

        // Any draft item makes the ledger authoritative again
        let mut ledger = ServiceItemLedger::new();
        ledger.draft = ItemDraft {
            description: "REPARO".into(),
            value: dec("50"),
            ..Default::default()
        };
        ledger.add_or_update().unwrap();
        let resolved = PricingInputs::resolve(&ledger, Some(&order), dec("10"), Decimal::ZERO);
        assert_eq!(resolved.services_sum, dec("50"));
        assert_eq!(total_amount(&resolved), dec("45"));
    }
}
