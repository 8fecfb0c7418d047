//! Data models for the On-Road Engine.
//!
//! The `models` module defines the value types that flow through a
//! price calculation: jurisdiction keys, fuel classes, price bands and
//! the resulting [`PriceBreakdown`].  Request and response shapes used
//! by the HTTP layer live here as well so that library callers can
//! reuse them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical key selecting a row of the tariff table.
///
/// Keys are the registration authority's own naming (for example
/// `"THE GOV OF NCT OF DELHI (UT)"`) and are therefore distinct from
/// the state name shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JurisdictionKey(String);

impl JurisdictionKey {
    /// Builds a key, upper-casing and trimming the input so lookups
    /// are insensitive to the caller's casing.
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JurisdictionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JurisdictionKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Fuel column of the tariff table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelClass {
    Petrol,
    Diesel,
    Cng,
    Electric,
}

impl FuelClass {
    pub const ALL: [FuelClass; 4] = [
        FuelClass::Petrol,
        FuelClass::Diesel,
        FuelClass::Cng,
        FuelClass::Electric,
    ];

    /// Classifies a free-form fuel label from vehicle data.
    ///
    /// Matching is a case-insensitive substring test applied in a
    /// fixed order, so the first rule that matches wins:
    ///
    /// | contains               | class      |
    /// |------------------------|------------|
    /// | `petrol`, `gasoline`   | `Petrol`   |
    /// | `diesel`               | `Diesel`   |
    /// | `cng`, `gas`           | `Cng`      |
    /// | `electric`, `ev`       | `Electric` |
    ///
    /// Returns `None` when no rule matches.
    pub fn from_label(label: &str) -> Option<Self> {
        let key = label.to_lowercase();
        if key.contains("petrol") || key.contains("gasoline") {
            Some(FuelClass::Petrol)
        } else if key.contains("diesel") {
            Some(FuelClass::Diesel)
        } else if key.contains("cng") || key.contains("gas") {
            Some(FuelClass::Cng)
        } else if key.contains("electric") || key.contains("ev") {
            Some(FuelClass::Electric)
        } else {
            None
        }
    }

    /// Like [`FuelClass::from_label`], but unmatched labels fall back to
    /// the petrol column with a warning.
    pub fn normalize(label: &str) -> Self {
        Self::from_label(label).unwrap_or_else(|| {
            tracing::warn!(fuel = label, "unrecognised fuel type, using petrol rates");
            FuelClass::Petrol
        })
    }
}

impl fmt::Display for FuelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FuelClass::Petrol => "Petrol",
            FuelClass::Diesel => "Diesel",
            FuelClass::Cng => "CNG",
            FuelClass::Electric => "Electric",
        };
        f.write_str(name)
    }
}

/// Ex-showroom price bracket used to pick a tariff rate.
///
/// Each band includes its upper bound: a price of exactly 5 lakh is in
/// [`PriceBand::UpTo5Lakh`], 5 lakh + 1 is in [`PriceBand::UpTo10Lakh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceBand {
    #[serde(rename = "0-5")]
    UpTo5Lakh,
    #[serde(rename = "5-10")]
    UpTo10Lakh,
    #[serde(rename = "10-20")]
    UpTo20Lakh,
    #[serde(rename = "20-30")]
    UpTo30Lakh,
    #[serde(rename = "30-40")]
    UpTo40Lakh,
    #[serde(rename = "40+")]
    Above40Lakh,
}

impl PriceBand {
    pub const COUNT: usize = 6;

    pub fn classify(price: Decimal) -> Self {
        if price <= dec!(500000) {
            PriceBand::UpTo5Lakh
        } else if price <= dec!(1000000) {
            PriceBand::UpTo10Lakh
        } else if price <= dec!(2000000) {
            PriceBand::UpTo20Lakh
        } else if price <= dec!(3000000) {
            PriceBand::UpTo30Lakh
        } else if price <= dec!(4000000) {
            PriceBand::UpTo40Lakh
        } else {
            PriceBand::Above40Lakh
        }
    }

    /// Column index into a tariff row, 0 through 5.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Itemised on-road price for one vehicle in one jurisdiction.
///
/// All amounts are rupees.  `total` is always the exact sum of the
/// eight monetary components listed by [`PriceBreakdown::line_items`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Jurisdiction whose tariff row was applied.  This is the row
    /// actually used, so it reflects any fallback to the default.
    pub jurisdiction: JurisdictionKey,
    /// Fuel column the registration tax was read from.
    pub fuel: FuelClass,
    /// Price band the ex-showroom price fell into.
    pub band: PriceBand,
    pub ex_showroom_price: Decimal,
    /// State registration tax (RTO charges).
    pub registration_tax: Decimal,
    /// Road safety cess, levied on the registration tax.
    pub road_safety_cess: Decimal,
    pub insurance: Decimal,
    /// Tax collected at source on high-value purchases.
    pub tcs: Decimal,
    /// Documentation and other dealer charges.
    pub other_charges: Decimal,
    pub hypothecation: Decimal,
    pub fastag: Decimal,
    pub total: Decimal,
}

impl PriceBreakdown {
    /// Monetary components in display order, excluding the total.
    pub fn line_items(&self) -> [(&'static str, Decimal); 8] {
        [
            ("Ex-Showroom Price", self.ex_showroom_price),
            ("RTO Charges", self.registration_tax),
            ("Road Safety Tax/Cess", self.road_safety_cess),
            ("Insurance", self.insurance),
            ("TCS", self.tcs),
            ("Other Charges", self.other_charges),
            ("Hypothecation", self.hypothecation),
            ("FASTag", self.fastag),
        ]
    }

    /// Everything added on top of the ex-showroom price.
    pub fn on_road_extras(&self) -> Decimal {
        self.total - self.ex_showroom_price
    }
}

/// Request body for a single on-road quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Ex-showroom price in rupees.
    pub ex_showroom_price: f64,
    /// Fuel label as it appears in vehicle data, e.g. `"Petrol"` or
    /// `"Electric (Battery)"`.
    pub fuel_type: String,
    /// A city name, a state name, or a `"City, State"` selection.
    pub city: String,
}

/// One vehicle in a batch quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Caller-chosen identifier echoed back in the result.
    pub id: String,
    pub ex_showroom_price: f64,
    pub fuel_type: String,
}

/// Many vehicles priced for the same location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchQuoteRequest {
    pub city: String,
    pub items: Vec<BatchItem>,
}

/// Outcome for one batch item.  Exactly one of `breakdown` and `error`
/// is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchQuoteResult {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<PriceBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
