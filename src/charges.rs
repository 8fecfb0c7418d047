//! Charges levied on top of the registration tax.
//!
//! Every function here is pure.  Rates are held in a [`ChargeSchedule`]
//! whose `Default` carries the current statutory and dealer values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Administrative fees that do not depend on price, place or fuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedCharges {
    /// Documentation and other dealer charges.
    pub other_charges: Decimal,
    pub hypothecation: Decimal,
    pub fastag: Decimal,
}

impl FixedCharges {
    pub fn total(&self) -> Decimal {
        self.other_charges + self.hypothecation + self.fastag
    }
}

impl Default for FixedCharges {
    fn default() -> Self {
        Self {
            other_charges: dec!(2000),
            hypothecation: dec!(1500),
            fastag: dec!(500),
        }
    }
}

/// Rates for the charges derived from price and registration tax.
///
/// Percentages are expressed in percent, so `4.6` means 4.6 %.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeSchedule {
    /// Levied on the registration tax, not on the ex-showroom price.
    pub road_safety_cess_pct: Decimal,
    /// Flat across jurisdictions and fuel types.
    pub insurance_pct: Decimal,
    pub tcs_pct: Decimal,
    /// TCS applies only to prices strictly above this amount.
    pub tcs_threshold: Decimal,
    pub fixed: FixedCharges,
}

impl Default for ChargeSchedule {
    fn default() -> Self {
        Self {
            road_safety_cess_pct: dec!(2),
            insurance_pct: dec!(4.6),
            tcs_pct: dec!(1),
            tcs_threshold: dec!(999000),
            fixed: FixedCharges::default(),
        }
    }
}

impl ChargeSchedule {
    pub fn road_safety_cess(&self, registration_tax: Decimal) -> Decimal {
        percent_of(registration_tax, self.road_safety_cess_pct)
    }

    pub fn insurance(&self, ex_showroom_price: Decimal) -> Decimal {
        percent_of(ex_showroom_price, self.insurance_pct)
    }

    pub fn tcs(&self, ex_showroom_price: Decimal) -> Decimal {
        if ex_showroom_price > self.tcs_threshold {
            percent_of(ex_showroom_price, self.tcs_pct)
        } else {
            Decimal::ZERO
        }
    }
}

fn percent_of(amount: Decimal, pct: Decimal) -> Decimal {
    amount * pct / dec!(100)
}
