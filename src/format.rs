//! Display helpers for price widgets.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Rounds to whole rupees and groups digits the Indian way:
/// `870900` becomes `"8,70,900"`.
pub fn format_indian_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };

    if digits.len() <= 3 {
        return format!("{sign}{digits}");
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{sign}{},{tail}", groups.join(","))
}

/// `871234` becomes `"8.71 Lakh"`.
pub fn format_lakh_price(amount: Decimal) -> String {
    let lakh = (amount / dec!(100000)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{lakh:.2} Lakh")
}

/// Loan assumptions behind the EMI shown next to an on-road price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmiTerms {
    pub down_payment_pct: Decimal,
    pub annual_rate_pct: Decimal,
    pub months: u32,
}

impl Default for EmiTerms {
    fn default() -> Self {
        Self {
            down_payment_pct: dec!(20),
            annual_rate_pct: dec!(8),
            months: 84,
        }
    }
}

impl EmiTerms {
    /// Monthly instalment on `price`, rounded to whole rupees.
    pub fn emi(&self, price: Decimal) -> Decimal {
        let principal = price - price * self.down_payment_pct / dec!(100);
        if self.months == 0 {
            return principal.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        }
        let months = Decimal::from(self.months);
        let monthly_rate = self.annual_rate_pct / dec!(12) / dec!(100);
        let emi = if monthly_rate.is_zero() {
            principal / months
        } else {
            let mut growth = Decimal::ONE;
            for _ in 0..self.months {
                growth *= Decimal::ONE + monthly_rate;
            }
            principal * monthly_rate * growth / (growth - Decimal::ONE)
        };
        emi.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// EMI under the default terms: 20 % down, 8 % a year, 7 years.
pub fn display_emi(on_road_price: Decimal) -> Decimal {
    EmiTerms::default().emi(on_road_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indian_grouping() {
        assert_eq!(format_indian_price(dec!(0)), "0");
        assert_eq!(format_indian_price(dec!(999)), "999");
        assert_eq!(format_indian_price(dec!(1000)), "1,000");
        assert_eq!(format_indian_price(dec!(870900)), "8,70,900");
        assert_eq!(format_indian_price(dec!(820166.40)), "8,20,166");
        assert_eq!(format_indian_price(dec!(12345678.5)), "1,23,45,679");
        assert_eq!(format_indian_price(dec!(-150000)), "-1,50,000");
    }

    #[test]
    fn lakh_format() {
        assert_eq!(format_lakh_price(dec!(871234)), "8.71 Lakh");
        assert_eq!(format_lakh_price(dec!(500000)), "5.00 Lakh");
        assert_eq!(format_lakh_price(dec!(12345678)), "123.46 Lakh");
    }

    #[test]
    fn emi_under_default_terms() {
        assert_eq!(display_emi(Decimal::ZERO), Decimal::ZERO);
        let emi = display_emi(dec!(1000000));
        assert!(emi > dec!(12400) && emi < dec!(12550), "emi was {emi}");
    }

    #[test]
    fn emi_without_interest_is_straight_division() {
        let terms = EmiTerms {
            down_payment_pct: dec!(0),
            annual_rate_pct: dec!(0),
            months: 10,
        };
        assert_eq!(terms.emi(dec!(100000)), dec!(10000));
    }
}
