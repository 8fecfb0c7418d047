//! Registration tax tariffs and their lookup.
//!
//! The `tariff` module holds the per-jurisdiction registration tax
//! schedule.  Each jurisdiction carries one row of six [`TariffEntry`]
//! values per [`FuelClass`], indexed by [`PriceBand`].  A cell is either
//! a percentage of the ex-showroom price or a flat rupee amount, and the
//! enum variant decides which.
//!
//! The built-in schedule reflects the RTO sheet dated 28/11/2024.  A
//! replacement may be loaded from JSON at startup with
//! [`load_tariff_file`].

use crate::error::TariffError;
use crate::models::{FuelClass, JurisdictionKey, PriceBand};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Jurisdiction applied when a key is unknown to the table or the city
/// directory.
pub const DEFAULT_JURISDICTION: &str = "MAHARASHTRA";

/// Upper bound on any tariff entry, whether percent or rupees.
pub const MAX_TARIFF_VALUE: Decimal = dec!(1000000000);

/// One cell of the tariff table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffEntry {
    /// Percent of the ex-showroom price, e.g. `11.76`.
    Percentage(Decimal),
    /// Fixed rupee amount, independent of price.
    Flat(Decimal),
}

impl TariffEntry {
    /// Registration tax this entry charges on `price`.
    pub fn apply(&self, price: Decimal) -> Decimal {
        match *self {
            TariffEntry::Percentage(pct) => price * pct / dec!(100),
            TariffEntry::Flat(amount) => amount,
        }
    }

    fn value(&self) -> Decimal {
        match *self {
            TariffEntry::Percentage(v) | TariffEntry::Flat(v) => v,
        }
    }
}

/// The four fuel columns of one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelRates {
    pub petrol: [TariffEntry; PriceBand::COUNT],
    pub diesel: [TariffEntry; PriceBand::COUNT],
    pub cng: [TariffEntry; PriceBand::COUNT],
    #[serde(alias = "ev")]
    pub electric: [TariffEntry; PriceBand::COUNT],
}

impl FuelRates {
    pub fn column(&self, fuel: FuelClass) -> &[TariffEntry; PriceBand::COUNT] {
        match fuel {
            FuelClass::Petrol => &self.petrol,
            FuelClass::Diesel => &self.diesel,
            FuelClass::Cng => &self.cng,
            FuelClass::Electric => &self.electric,
        }
    }
}

/// Registration tax computed for one vehicle, along with the row and
/// cell that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationTax {
    /// Jurisdiction actually used, after any fallback.
    pub jurisdiction: JurisdictionKey,
    pub band: PriceBand,
    pub entry: TariffEntry,
    pub amount: Decimal,
}

/// Serialized layout of a tariff file.
#[derive(Debug, Deserialize)]
struct TariffFile {
    #[serde(default = "default_jurisdiction_name")]
    default_jurisdiction: String,
    jurisdictions: HashMap<String, FuelRates>,
}

fn default_jurisdiction_name() -> String {
    DEFAULT_JURISDICTION.to_string()
}

/// Immutable registration tax schedule keyed by jurisdiction.
#[derive(Debug, Clone)]
pub struct TariffTable {
    rows: HashMap<JurisdictionKey, FuelRates>,
    default_key: JurisdictionKey,
    default_rates: FuelRates,
}

impl TariffTable {
    /// Builds a table from `(jurisdiction, rates)` rows.
    ///
    /// Fails if `default_jurisdiction` has no row or if any entry is
    /// negative or above [`MAX_TARIFF_VALUE`].  Later rows with the same
    /// key replace earlier ones.
    pub fn from_rows<K, I>(default_jurisdiction: &str, rows: I) -> Result<Self, TariffError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, FuelRates)>,
    {
        let rows: HashMap<JurisdictionKey, FuelRates> = rows
            .into_iter()
            .map(|(key, rates)| (JurisdictionKey::new(key), rates))
            .collect();

        for (key, rates) in &rows {
            for fuel in FuelClass::ALL {
                let column = rates.column(fuel);
                if let Some(band) = column.iter().position(|e| e.value() < Decimal::ZERO) {
                    return Err(TariffError::NegativeEntry {
                        jurisdiction: key.to_string(),
                        fuel: fuel.to_string(),
                        band,
                    });
                }
                if let Some(band) = column.iter().position(|e| e.value() > MAX_TARIFF_VALUE) {
                    return Err(TariffError::OversizedEntry {
                        jurisdiction: key.to_string(),
                        fuel: fuel.to_string(),
                        band,
                        max: MAX_TARIFF_VALUE,
                    });
                }
            }
        }

        let default_key = JurisdictionKey::new(default_jurisdiction);
        let default_rates = rows
            .get(&default_key)
            .cloned()
            .ok_or_else(|| TariffError::MissingDefault(default_key.to_string()))?;

        Ok(Self {
            rows,
            default_key,
            default_rates,
        })
    }

    /// Parses a JSON tariff document.
    ///
    /// ```json
    /// {
    ///   "default_jurisdiction": "MAHARASHTRA",
    ///   "jurisdictions": {
    ///     "MAHARASHTRA": {
    ///       "petrol":   [{"percentage": 12.22}, ...],
    ///       "diesel":   [...],
    ///       "cng":      [...],
    ///       "electric": [{"flat": 3060}, ...]
    ///     }
    ///   }
    /// }
    /// ```
    pub fn from_json_str(data: &str) -> Result<Self, TariffError> {
        let file: TariffFile = serde_json::from_str(data)?;
        Self::from_rows(&file.default_jurisdiction, file.jurisdictions)
    }

    /// Shared handle to the compiled-in schedule.
    pub fn builtin() -> Arc<TariffTable> {
        Arc::clone(&BUILTIN_TARIFFS)
    }

    pub fn default_jurisdiction(&self) -> &JurisdictionKey {
        &self.default_key
    }

    pub fn contains(&self, jurisdiction: &JurisdictionKey) -> bool {
        self.rows.contains_key(jurisdiction)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Jurisdiction keys in alphabetical order.
    pub fn jurisdictions(&self) -> Vec<&JurisdictionKey> {
        let mut keys: Vec<_> = self.rows.keys().collect();
        keys.sort();
        keys
    }

    /// Returns the row for `jurisdiction`, or the default row when the
    /// key is unknown.  The returned key names the row actually used.
    pub fn row<'a>(&'a self, jurisdiction: &'a JurisdictionKey) -> (&'a JurisdictionKey, &'a FuelRates) {
        match self.rows.get(jurisdiction) {
            Some(rates) => (jurisdiction, rates),
            None => {
                tracing::warn!(
                    jurisdiction = %jurisdiction,
                    fallback = %self.default_key,
                    "jurisdiction not found in tariff table, using default"
                );
                (&self.default_key, &self.default_rates)
            }
        }
    }

    pub fn entry(&self, jurisdiction: &JurisdictionKey, fuel: FuelClass, band: PriceBand) -> TariffEntry {
        let (_, rates) = self.row(jurisdiction);
        rates.column(fuel)[band.index()]
    }

    /// Registration tax for a vehicle priced at `price`.
    pub fn registration_tax(
        &self,
        price: Decimal,
        jurisdiction: &JurisdictionKey,
        fuel: FuelClass,
    ) -> RegistrationTax {
        let band = PriceBand::classify(price);
        let (applied, rates) = self.row(jurisdiction);
        let entry = rates.column(fuel)[band.index()];
        RegistrationTax {
            jurisdiction: applied.clone(),
            band,
            entry,
            amount: entry.apply(price),
        }
    }
}

/// Load a tariff table from a JSON file on disk.
pub fn load_tariff_file(path: &Path) -> Result<TariffTable, TariffError> {
    let data = std::fs::read_to_string(path).map_err(|source| TariffError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = TariffTable::from_json_str(&data)?;
    tracing::info!(path = %path.display(), jurisdictions = table.len(), "loaded tariff table");
    Ok(table)
}

static BUILTIN_TARIFFS: Lazy<Arc<TariffTable>> = Lazy::new(|| {
    Arc::new(
        TariffTable::from_rows(DEFAULT_JURISDICTION, builtin_rows())
            .expect("built-in tariff rows include the default jurisdiction"),
    )
});

macro_rules! pct {
    ($($v:tt),+ $(,)?) => { [$(TariffEntry::Percentage(dec!($v))),+] };
}

macro_rules! flat {
    ($($v:tt),+ $(,)?) => { [$(TariffEntry::Flat(dec!($v))),+] };
}

fn builtin_rows() -> Vec<(&'static str, FuelRates)> {
    vec![
        ("ANDHRA PRADESH", FuelRates {
            petrol: pct![13, 14, 17, 18, 18, 18],
            diesel: pct![13, 14, 17, 18, 18, 18],
            cng: pct![14.84, 14.84, 17.78, 17.78, 17.78, 17.78],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("ARUNACHAL PRADESH", FuelRates {
            petrol: pct![2, 3, 3, 5, 5, 5],
            diesel: pct![2, 3, 3, 5, 5, 5],
            cng: pct![3.84, 3.84, 4.78, 4.78, 4.78, 4.78],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("ASSAM", FuelRates {
            petrol: pct![5, 6, 8, 12, 14, 14],
            diesel: pct![10.9, 10.9, 10.75, 14.53, 14.71, 14.58],
            cng: pct![10.84, 10.84, 10.70, 10.70, 10.70, 10.70],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("BIHAR", FuelRates {
            petrol: pct![10.18, 10.17, 9.42, 8, 7.82, 7.95],
            diesel: pct![9, 9, 12, 12, 12, 12],
            cng: pct![9, 9, 12, 12, 12, 12],
            electric: pct![9.62, 9.62, 12.66, 12.48, 12.81, 12.51],
        }),
        ("CHHATTISGARH", FuelRates {
            petrol: pct![9, 10, 10, 10, 10, 10],
            diesel: pct![9, 10, 10, 10, 10, 10],
            cng: pct![9, 10, 10, 10, 10, 10],
            electric: pct![5.20, 5.20, 5, 5.40, 5.81, 5.51],
        }),
        ("GOA", FuelRates {
            petrol: pct![9, 9, 12.80, 16.78, 16.31, 17.08],
            diesel: pct![9, 9, 12.83, 16.78, 16.3, 17],
            cng: pct![9, 9, 12.83, 16.78, 16.31, 17],
            electric: flat![5000, 5000, 27000, 62000, 75000, 75000],
        }),
        ("GUJARAT", FuelRates {
            petrol: pct![6, 6, 6, 6, 6, 6],
            diesel: pct![6, 6, 6, 6, 6, 6],
            cng: pct![6, 6, 6, 6, 6, 6],
            electric: pct![6.34, 6.34, 6.38, 6.19, 6.53, 6.22],
        }),
        ("HARYANA", FuelRates {
            petrol: pct![5, 8, 8, 10, 10, 10],
            diesel: pct![5, 8, 8, 10, 10, 10],
            cng: pct![4, 6.40, 6.40, 8, 8, 8],
            electric: pct![2.69, 2.69, 2.21, 10.48, 10.88, 10.51],
        }),
        ("HIMACHAL PRADESH", FuelRates {
            petrol: pct![6.6, 6.6, 6.5, 7.5, 7.5, 7.5],
            diesel: pct![6.6, 6.6, 7.7, 7.7, 7.7, 7.7],
            cng: pct![6.60, 6.60, 7.70, 7.70, 7.70, 7.70],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("JHARKHAND", FuelRates {
            petrol: pct![8, 7.65, 9.81, 9.19, 9.09, 9.56],
            diesel: pct![9, 9, 9, 9.12, 9.71, 9.19],
            cng: pct![7.85, 7.85, 9.40, 9.40, 9.40, 9.40],
            electric: pct![9.61, 9.61, 9.16, 9.48, 9.81, 9.51],
        }),
        ("KARNATAKA", FuelRates {
            petrol: pct![15.33, 16.13, 16.05, 19.13, 18.81, 21.09],
            diesel: pct![14.60, 15.66, 18.92, 20, 20, 20],
            cng: pct![15.01, 15.01, 17.85, 17.85, 17.85, 17.85],
            electric: flat![6000, 6000, 13000, 13000, 11850, 11530],
        }),
        ("KERALA", FuelRates {
            petrol: pct![10.50, 13.33, 13.28, 15.70, 22.70, 22.50],
            diesel: pct![13.2, 13.2, 15, 22.5, 22, 22.5],
            cng: pct![13.84, 13.84, 17.14, 17.14, 17.14, 17.14],
            electric: pct![5, 5, 5.66, 5.48, 5.81, 5.51],
        }),
        ("MADHYA PRADESH", FuelRates {
            petrol: pct![8.60, 8, 10.61, 14.56, 14.78, 14.56],
            diesel: pct![10, 10, 12, 16, 16, 16],
            cng: pct![8, 8, 10, 14, 14, 14],
            electric: pct![4.62, 4.62, 4.66, 4.48, 4.81, 4.51],
        }),
        ("MAHARASHTRA", FuelRates {
            petrol: pct![12.22, 11.76, 12.66, 13.83, 13.55, 13.31],
            diesel: pct![13, 13, 14, 15, 15, 15],
            cng: pct![7, 7, 8, 9, 9, 9],
            electric: flat![3060, 3060, 5100, 12240, 25500, 25500],
        }),
        ("MANIPUR", FuelRates {
            petrol: pct![5.80, 6.66, 7.61, 8.56, 8.41, 8.56],
            diesel: pct![5, 6, 7, 8, 8, 8],
            cng: pct![5, 6, 8, 8, 8, 8],
            electric: pct![5.42, 5.42, 7.06, 6.88, 7.21, 7],
        }),
        ("MEGHALAYA", FuelRates {
            petrol: pct![6.82, 6.66, 6.60, 10.49, 10.78, 10.56],
            diesel: pct![6, 6, 6, 11, 11, 11],
            cng: pct![6.84, 6.84, 8.78, 8.78, 8.78, 8.78],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("MIZORAM", FuelRates {
            petrol: pct![6.82, 6.77, 6.66, 6.49, 6.78, 6.56],
            diesel: pct![6, 6, 6, 6, 6, 6],
            cng: flat![5000, 5000, 12000, 12000, 12000, 12000],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("NAGALAND", FuelRates {
            petrol: pct![6, 6, 6, 6, 6, 6],
            diesel: pct![6, 6, 6, 6, 6, 6],
            cng: pct![6.84, 6.84, 6.78, 6.78, 6.78, 6.78],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("ODISHA", FuelRates {
            petrol: pct![6.50, 8.30, 10, 10, 10, 10.50],
            diesel: pct![8.4, 8.4, 10.2, 10.5, 10, 10],
            cng: pct![8.84, 8.84, 10, 10, 10, 10],
            electric: pct![1.64, 1.64, 1.64, 12, 25, 25],
        }),
        ("PUNJAB", FuelRates {
            petrol: pct![8.90, 8.75, 8.36, 8.49, 8.69, 8.56],
            diesel: pct![10.5, 10.5, 10.5, 13, 14, 14],
            cng: pct![10.5, 10.5, 13, 14, 14, 14],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("RAJASTHAN", FuelRates {
            petrol: pct![9.82, 9.77, 9.61, 10.49, 12.69, 10.56],
            diesel: pct![10, 10.12, 10.12, 10.12, 10.12, 10.12],
            cng: pct![5.60, 5.60, 5.60, 5.60, 5.60, 5.60],
            electric: flat![2200, 2200, 12000, 12000, 25000, 25000],
        }),
        ("SIKKIM", FuelRates {
            petrol: flat![16000, 16000, 16000, 16000, 16000, 16000],
            diesel: flat![16000, 16000, 16000, 16000, 16000, 16000],
            cng: flat![1600, 1600, 1600, 1600, 1600, 1600],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("TAMIL NADU", FuelRates {
            petrol: pct![12, 13, 18, 20, 20, 20],
            diesel: pct![12, 13, 18, 20, 20, 20],
            cng: pct![12, 13, 18, 20, 20, 20],
            electric: flat![6500, 6500, 13500, 13500, 26500, 26500],
        }),
        ("TELANGANA", FuelRates {
            petrol: pct![13.82, 14.70, 17.61, 18.50, 18.69, 18.56],
            diesel: pct![13.4, 14.2, 17, 18.5, 18, 18],
            cng: pct![14.84, 14.84, 17.78, 17.78, 17.78, 17.78],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("TRIPURA", FuelRates {
            petrol: pct![3, 3.5, 4, 4, 4, 4],
            diesel: pct![3, 3.5, 4, 4, 4, 4],
            cng: pct![3, 1.50, 4, 4, 4, 4],
            electric: pct![3.20, 3.20, 3.66, 3.48, 3.81, 3.51],
        }),
        ("UTTARAKHAND", FuelRates {
            petrol: pct![8, 9, 10, 10, 10, 10],
            diesel: pct![8, 9, 10, 10, 10, 10],
            cng: pct![8, 9, 10, 10, 10, 10],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("UTTAR PRADESH", FuelRates {
            petrol: pct![8, 8, 10, 10, 10, 10],
            diesel: pct![7, 7, 7, 7, 7, 7],
            cng: pct![8, 8, 10, 10, 10, 10],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("WEST BENGAL", FuelRates {
            petrol: pct![15.7, 10, 10, 10, 10, 10],
            diesel: pct![13.7, 10, 10, 10, 10, 10],
            cng: pct![12.78, 9.30, 9.30, 9.30, 9.30, 9.60],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("ANDAMAN & NICOBAR ISLAND", FuelRates {
            petrol: pct![10.5, 10.5, 10.5, 10.5, 10.5, 10.5],
            diesel: pct![10.5, 10.5, 10.5, 10.5, 10.5, 10.5],
            cng: pct![1.25, 1.25, 1, 1, 1, 1],
            electric: flat![9500, 9500, 16500, 16500, 29500, 29500],
        }),
        ("CHANDIGARH (UT)", FuelRates {
            petrol: pct![8.41, 8.18, 7.96, 8.49, 8.41, 9.64],
            diesel: pct![7.91, 7.91, 7.42, 8.23, 8.18, 8.07],
            cng: pct![8.60, 8.60, 7.08, 7.08, 7.08, 7.08],
            electric: flat![5000, 5000, 12000, 12000, 25000, 27150],
        }),
        ("DADRA & NAGAR HAVELI (UT)", FuelRates {
            petrol: pct![10.5, 10.5, 10.5, 10.5, 10.5, 10.5],
            diesel: pct![3.40, 3.40, 3.75, 3.50, 3.71, 3.58],
            cng: pct![3.34, 3.34, 3.78, 3.78, 3.78, 3.78],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
        ("THE GOV OF NCT OF DELHI (UT)", FuelRates {
            petrol: pct![4, 7, 10, 10, 10, 10],
            diesel: pct![5, 8.7, 12.5, 12.5, 12.5, 12.5],
            cng: pct![4, 7, 10, 10, 10, 10],
            electric: flat![9000, 9000, 10000, 16000, 29000, 29000],
        }),
        ("JAMMU & KASHMIR (UT)", FuelRates {
            petrol: flat![1200, 1200, 1200, 1200, 1200, 1200],
            diesel: flat![1200, 1200, 1200, 1200, 1200, 1200],
            cng: pct![9.84, 9.84, 9.78, 9.78, 9.78, 9.78],
            electric: flat![1550, 1550, 12000, 12000, 25000, 25000],
        }),
        ("LAKSHADWEEP (UT)", FuelRates {
            petrol: pct![10.8, 13, 15, 22.5, 22.5, 22.5],
            diesel: pct![13.2, 13.2, 15, 22.5, 22, 22.5],
            cng: pct![13.84, 13.84, 17.14, 17.14, 17.14, 17.14],
            electric: pct![5, 5, 5.66, 5.48, 5.81, 5.51],
        }),
        ("PUDUCHERRY (UT)", FuelRates {
            petrol: pct![13.17, 4.77, 7.61, 7.49, 7.78, 7.56],
            diesel: pct![4, 4, 7, 7, 7, 7],
            cng: flat![5000, 5000, 12000, 12000, 12000, 12000],
            electric: flat![5000, 5000, 12000, 12000, 25000, 25000],
        }),
    ]
}
