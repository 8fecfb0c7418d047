//! On-road price computation engine.
//!
//! The `engine` module turns an ex-showroom price, a location and a fuel
//! label into a [`PriceBreakdown`].  Reference data is held behind
//! `Arc`s and never mutated, so one [`OnRoadEngine`] can serve any
//! number of threads.  Batch quotes use the [`rayon`] crate to spread
//! items across CPU cores.

use crate::charges::ChargeSchedule;
use crate::city::CityDirectory;
use crate::error::PriceError;
use crate::models::{
    BatchQuoteRequest, BatchQuoteResult, FuelClass, JurisdictionKey, PriceBreakdown, QuoteRequest,
};
use crate::tariff::TariffTable;
use rayon::prelude::*;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Converts a boundary price into a [`Decimal`], rejecting NaN,
/// infinities and negative values.
pub fn price_from_f64(raw: f64) -> Result<Decimal, PriceError> {
    if !raw.is_finite() {
        return Err(PriceError::NotFinite(raw));
    }
    let price = Decimal::from_f64(raw).ok_or(PriceError::OutOfRange(raw))?;
    validate_price(price)
}

/// Largest accepted ex-showroom price, 10^15 rupees.
///
/// Keeps `price × rate` and the running total inside `Decimal`'s range
/// for any tariff entry up to [`crate::tariff::MAX_TARIFF_VALUE`].
pub const MAX_EX_SHOWROOM_PRICE: Decimal = dec!(1000000000000000);

pub fn validate_price(price: Decimal) -> Result<Decimal, PriceError> {
    if price < Decimal::ZERO {
        return Err(PriceError::Negative(price));
    }
    if price > MAX_EX_SHOWROOM_PRICE {
        return Err(PriceError::ExceedsCeiling(price, MAX_EX_SHOWROOM_PRICE));
    }
    Ok(price)
}

/// Stateless calculator over shared tariff and city data.
#[derive(Debug, Clone)]
pub struct OnRoadEngine {
    tariffs: Arc<TariffTable>,
    cities: Arc<CityDirectory>,
    schedule: ChargeSchedule,
}

impl Default for OnRoadEngine {
    fn default() -> Self {
        Self::new(TariffTable::builtin(), CityDirectory::builtin(), ChargeSchedule::default())
    }
}

impl OnRoadEngine {
    /// Builds an engine, warning about any city jurisdiction that has no
    /// tariff row.  Such cities are still priced, using the table's
    /// default row.
    pub fn new(tariffs: Arc<TariffTable>, cities: Arc<CityDirectory>, schedule: ChargeSchedule) -> Self {
        for key in cities.jurisdictions() {
            if !tariffs.contains(&key) {
                tracing::warn!(
                    jurisdiction = %key,
                    fallback = %tariffs.default_jurisdiction(),
                    "city directory references a jurisdiction missing from the tariff table"
                );
            }
        }
        Self {
            tariffs,
            cities,
            schedule,
        }
    }

    pub fn tariffs(&self) -> &TariffTable {
        &self.tariffs
    }

    pub fn cities(&self) -> &CityDirectory {
        &self.cities
    }

    pub fn schedule(&self) -> &ChargeSchedule {
        &self.schedule
    }

    /// Full breakdown for an already-resolved jurisdiction.
    pub fn quote(
        &self,
        ex_showroom_price: Decimal,
        jurisdiction: &JurisdictionKey,
        fuel: FuelClass,
    ) -> Result<PriceBreakdown, PriceError> {
        let price = validate_price(ex_showroom_price)?;
        let rto = self.tariffs.registration_tax(price, jurisdiction, fuel);
        // Cess is levied on the registration tax, so it must come second.
        let road_safety_cess = self.schedule.road_safety_cess(rto.amount);
        let insurance = self.schedule.insurance(price);
        let tcs = self.schedule.tcs(price);
        let fixed = self.schedule.fixed;

        let total = price
            + rto.amount
            + road_safety_cess
            + insurance
            + tcs
            + fixed.other_charges
            + fixed.hypothecation
            + fixed.fastag;

        Ok(PriceBreakdown {
            jurisdiction: rto.jurisdiction,
            fuel,
            band: rto.band,
            ex_showroom_price: price,
            registration_tax: rto.amount,
            road_safety_cess,
            insurance,
            tcs,
            other_charges: fixed.other_charges,
            hypothecation: fixed.hypothecation,
            fastag: fixed.fastag,
            total,
        })
    }

    /// Breakdown for a city or state name and a free-form fuel label.
    pub fn quote_for_city(
        &self,
        ex_showroom_price: Decimal,
        city: &str,
        fuel_label: &str,
    ) -> Result<PriceBreakdown, PriceError> {
        let jurisdiction = self.cities.resolve(city);
        self.quote(ex_showroom_price, &jurisdiction, FuelClass::normalize(fuel_label))
    }

    /// Breakdown for a `"City, State"` selection as stored by the
    /// location picker.
    pub fn quote_for_selection(
        &self,
        ex_showroom_price: Decimal,
        selection: &str,
        fuel_label: &str,
    ) -> Result<PriceBreakdown, PriceError> {
        let jurisdiction = self.cities.resolve_selection(selection);
        self.quote(ex_showroom_price, &jurisdiction, FuelClass::normalize(fuel_label))
    }

    pub fn quote_request(&self, request: &QuoteRequest) -> Result<PriceBreakdown, PriceError> {
        let price = price_from_f64(request.ex_showroom_price)?;
        self.quote_for_selection(price, &request.city, &request.fuel_type)
    }

    /// Registration tax alone, for list views that show only RTO.
    pub fn registration_tax(
        &self,
        ex_showroom_price: Decimal,
        jurisdiction: &JurisdictionKey,
        fuel: FuelClass,
    ) -> Result<Decimal, PriceError> {
        let price = validate_price(ex_showroom_price)?;
        Ok(self.tariffs.registration_tax(price, jurisdiction, fuel).amount)
    }

    /// Prices every item for one location.
    ///
    /// The location is resolved once.  Items are computed in parallel
    /// and returned in input order; an invalid price fails only its own
    /// item.
    pub fn quote_batch(&self, request: &BatchQuoteRequest) -> Vec<BatchQuoteResult> {
        let jurisdiction = self.cities.resolve_selection(&request.city);
        request
            .items
            .par_iter()
            .map(|item| {
                let outcome = price_from_f64(item.ex_showroom_price).and_then(|price| {
                    self.quote(price, &jurisdiction, FuelClass::normalize(&item.fuel_type))
                });
                match outcome {
                    Ok(breakdown) => BatchQuoteResult {
                        id: item.id.clone(),
                        breakdown: Some(breakdown),
                        error: None,
                    },
                    Err(err) => BatchQuoteResult {
                        id: item.id.clone(),
                        breakdown: None,
                        error: Some(err.to_string()),
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchItem, PriceBand};
    use crate::tariff::{FuelRates, TariffEntry, MAX_TARIFF_VALUE};

    fn engine() -> OnRoadEngine {
        OnRoadEngine::default()
    }

    fn assert_total_is_sum(b: &PriceBreakdown) {
        let sum: Decimal = b.line_items().iter().map(|(_, amount)| *amount).sum();
        assert_eq!(b.total, sum);
        for (label, amount) in b.line_items() {
            assert!(amount >= Decimal::ZERO, "{label} is negative");
        }
    }

    #[test]
    fn mumbai_petrol_end_to_end() {
        let b = engine().quote_for_city(dec!(700000), "Mumbai", "Petrol").unwrap();
        assert_eq!(b.jurisdiction.as_str(), "MAHARASHTRA");
        assert_eq!(b.band, PriceBand::UpTo10Lakh);
        assert_eq!(b.registration_tax, dec!(82320));
        assert_eq!(b.road_safety_cess, dec!(1646.40));
        assert_eq!(b.insurance, dec!(32200));
        assert_eq!(b.tcs, Decimal::ZERO);
        assert_eq!(b.other_charges + b.hypothecation + b.fastag, dec!(4000));
        assert_eq!(b.total, dec!(820166.40));
        assert_eq!(b.on_road_extras(), dec!(120166.40));
        assert_total_is_sum(&b);
    }

    #[test]
    fn flat_tariff_ignores_price_magnitude() {
        let engine = engine();
        for price in [dec!(300000), dec!(450000)] {
            let b = engine.quote_for_city(price, "Visakhapatnam", "Electric").unwrap();
            assert_eq!(b.registration_tax, dec!(5000));
            assert_eq!(b.road_safety_cess, dec!(100));
        }
    }

    #[test]
    fn cess_follows_registration_tax_not_price() {
        let b = engine().quote_for_city(dec!(1500000), "Chennai", "Diesel").unwrap();
        assert_eq!(b.registration_tax, dec!(270000));
        assert_eq!(b.road_safety_cess, dec!(5400));
        assert_eq!(b.tcs, dec!(15000));
        assert_total_is_sum(&b);
    }

    #[test]
    fn insurance_is_independent_of_location_and_fuel() {
        let engine = engine();
        for (city, fuel) in [("Delhi", "Petrol"), ("Kochi", "Electric"), ("Jaipur", "CNG"), ("Shimla", "Diesel")] {
            let b = engine.quote_for_city(dec!(850000), city, fuel).unwrap();
            assert_eq!(b.insurance, dec!(39100));
        }
    }

    #[test]
    fn tcs_boundary_in_full_quote() {
        let engine = engine();
        let at = engine.quote_for_city(dec!(999000), "Pune", "Petrol").unwrap();
        assert_eq!(at.tcs, Decimal::ZERO);
        let above = engine.quote_for_city(dec!(999001), "Pune", "Petrol").unwrap();
        assert_eq!(above.tcs, dec!(9990.01));
        assert_total_is_sum(&above);
    }

    #[test]
    fn unknown_city_and_fuel_degrade_to_defaults() {
        let b = engine().quote_for_city(dec!(700000), "Nowhereville", "Hydrogen").unwrap();
        assert_eq!(b.jurisdiction.as_str(), "MAHARASHTRA");
        assert_eq!(b.fuel, FuelClass::Petrol);
        assert_eq!(b.total, dec!(820166.40));
    }

    #[test]
    fn unknown_jurisdiction_reports_the_row_used() {
        let b = engine()
            .quote(dec!(700000), &JurisdictionKey::new("ATLANTIS"), FuelClass::Petrol)
            .unwrap();
        assert_eq!(b.jurisdiction.as_str(), "MAHARASHTRA");
        assert_eq!(b.registration_tax, dec!(82320));
    }

    #[test]
    fn identical_inputs_give_identical_breakdowns() {
        let engine = engine();
        let a = engine.quote_for_city(dec!(2750000), "Bengaluru", "Diesel").unwrap();
        let b = engine.quote_for_city(dec!(2750000), "Bengaluru", "Diesel").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn total_is_exact_across_the_table() {
        let engine = engine();
        let prices = [dec!(0), dec!(499999), dec!(500000), dec!(1000001), dec!(2999999.99), dec!(4000001)];
        for key in engine.tariffs().jurisdictions() {
            for fuel in FuelClass::ALL {
                for price in prices {
                    let b = engine.quote(price, key, fuel).unwrap();
                    assert_total_is_sum(&b);
                }
            }
        }
    }

    #[test]
    fn negative_and_non_finite_prices_are_rejected() {
        let engine = engine();
        assert_eq!(
            engine.quote(dec!(-1), &JurisdictionKey::new("GOA"), FuelClass::Petrol),
            Err(PriceError::Negative(dec!(-1)))
        );
        assert!(matches!(price_from_f64(f64::NAN), Err(PriceError::NotFinite(_))));
        assert!(matches!(price_from_f64(f64::INFINITY), Err(PriceError::NotFinite(_))));
        assert!(matches!(price_from_f64(-5.0), Err(PriceError::Negative(_))));
        assert!(matches!(price_from_f64(1e30), Err(PriceError::OutOfRange(_))));
        assert_eq!(price_from_f64(700000.0), Ok(dec!(700000)));
    }

    #[test]
    fn huge_prices_are_rejected_instead_of_overflowing() {
        let engine = engine();
        let request = QuoteRequest {
            ex_showroom_price: 7.0e27,
            fuel_type: "Petrol".into(),
            city: "Mumbai".into(),
        };
        assert!(matches!(engine.quote_request(&request), Err(PriceError::ExceedsCeiling(..))));

        let kerala = JurisdictionKey::new("KERALA");
        assert!(matches!(
            engine.quote(Decimal::MAX, &kerala, FuelClass::Petrol),
            Err(PriceError::ExceedsCeiling(..))
        ));
        assert!(matches!(
            engine.registration_tax(Decimal::MAX, &kerala, FuelClass::Petrol),
            Err(PriceError::ExceedsCeiling(..))
        ));
    }

    #[test]
    fn ceiling_price_with_largest_entries_stays_exact() {
        let rates = FuelRates {
            petrol: [TariffEntry::Percentage(MAX_TARIFF_VALUE); 6],
            diesel: [TariffEntry::Flat(MAX_TARIFF_VALUE); 6],
            cng: [TariffEntry::Percentage(dec!(22.7)); 6],
            electric: [TariffEntry::Flat(dec!(0)); 6],
        };
        let tariffs = Arc::new(TariffTable::from_rows("GOA", vec![("GOA", rates)]).unwrap());
        let engine = OnRoadEngine::new(tariffs, CityDirectory::builtin(), ChargeSchedule::default());
        let goa = JurisdictionKey::new("GOA");
        for fuel in FuelClass::ALL {
            let b = engine.quote(MAX_EX_SHOWROOM_PRICE, &goa, fuel).unwrap();
            assert_total_is_sum(&b);
        }
        let batch = engine.quote_batch(&BatchQuoteRequest {
            city: "Panaji".into(),
            items: vec![BatchItem { id: "big".into(), ex_showroom_price: 7.0e27, fuel_type: "Petrol".into() }],
        });
        assert!(batch[0].error.as_deref().unwrap().contains("maximum"));
    }

    #[test]
    fn quote_request_uses_selection_format() {
        let request = QuoteRequest {
            ex_showroom_price: 700000.0,
            fuel_type: "Petrol".into(),
            city: "Smalltown, Gujarat".into(),
        };
        let b = engine().quote_request(&request).unwrap();
        assert_eq!(b.jurisdiction.as_str(), "GUJARAT");
        assert_eq!(b.registration_tax, dec!(42000));
    }

    #[test]
    fn registration_tax_only() {
        let tax = engine()
            .registration_tax(dec!(5000000), &JurisdictionKey::new("KERALA"), FuelClass::Petrol)
            .unwrap();
        assert_eq!(tax, dec!(1125000));
    }

    #[test]
    fn batch_keeps_order_and_isolates_failures() {
        let request = BatchQuoteRequest {
            city: "Hyderabad, Telangana".into(),
            items: vec![
                BatchItem { id: "a".into(), ex_showroom_price: 600000.0, fuel_type: "Petrol".into() },
                BatchItem { id: "b".into(), ex_showroom_price: -1.0, fuel_type: "Petrol".into() },
                BatchItem { id: "c".into(), ex_showroom_price: 1800000.0, fuel_type: "EV".into() },
            ],
        };
        let results = engine().quote_batch(&request);
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        let a = results[0].breakdown.as_ref().unwrap();
        assert_eq!(a.jurisdiction.as_str(), "TELANGANA");
        assert_eq!(a.registration_tax, dec!(88200));

        assert!(results[1].breakdown.is_none());
        assert!(results[1].error.as_deref().unwrap().contains("negative"));

        let c = results[2].breakdown.as_ref().unwrap();
        assert_eq!(c.registration_tax, dec!(12000));
    }

    #[test]
    fn custom_schedule_and_table_are_honoured() {
        let rates = FuelRates {
            petrol: [TariffEntry::Percentage(dec!(10)); 6],
            diesel: [TariffEntry::Percentage(dec!(10)); 6],
            cng: [TariffEntry::Flat(dec!(1000)); 6],
            electric: [TariffEntry::Flat(dec!(0)); 6],
        };
        let tariffs = Arc::new(TariffTable::from_rows("GOA", vec![("GOA", rates)]).unwrap());
        let schedule = ChargeSchedule {
            insurance_pct: dec!(3),
            ..ChargeSchedule::default()
        };
        let engine = OnRoadEngine::new(tariffs, CityDirectory::builtin(), schedule);

        // Mumbai's jurisdiction is absent here, so the GOA row applies.
        let b = engine.quote_for_city(dec!(400000), "Mumbai", "Petrol").unwrap();
        assert_eq!(b.jurisdiction.as_str(), "GOA");
        assert_eq!(b.registration_tax, dec!(40000));
        assert_eq!(b.insurance, dec!(12000));
        assert_total_is_sum(&b);
    }
}
