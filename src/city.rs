//! City to jurisdiction resolution.
//!
//! Users pick a city; tariffs are keyed by registration jurisdiction.
//! [`CityDirectory`] bridges the two with case-insensitive O(1) maps
//! built once from the static city list.  A name shared by cities in
//! two states resolves to whichever record appears first.

use crate::models::JurisdictionKey;
use crate::tariff::DEFAULT_JURISDICTION;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// State name reported for cities that are not in the directory.
pub const DEFAULT_STATE: &str = "Maharashtra";

/// Maximum number of results returned by [`CityDirectory::search`].
pub const SEARCH_LIMIT: usize = 10;

/// A city known to the location picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CityRecord {
    pub city: &'static str,
    /// State name as shown to users.
    pub state: &'static str,
    /// Tariff row applied to vehicles registered here.
    pub jurisdiction: &'static str,
    /// Listed first in location dropdowns.
    pub popular: bool,
}

/// Immutable lookup structure over a list of [`CityRecord`]s.
#[derive(Debug, Clone)]
pub struct CityDirectory {
    records: Vec<CityRecord>,
    by_city: HashMap<String, usize>,
    by_state: HashMap<String, JurisdictionKey>,
    default_key: JurisdictionKey,
}

impl CityDirectory {
    pub fn new(records: Vec<CityRecord>, default_jurisdiction: &str) -> Self {
        let mut by_city = HashMap::with_capacity(records.len());
        let mut by_state = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_city.entry(record.city.to_lowercase()).or_insert(idx);
            by_state
                .entry(record.state.to_lowercase())
                .or_insert_with(|| JurisdictionKey::new(record.jurisdiction));
        }
        Self {
            records,
            by_city,
            by_state,
            default_key: JurisdictionKey::new(default_jurisdiction),
        }
    }

    /// Shared handle to the compiled-in city list.
    pub fn builtin() -> Arc<CityDirectory> {
        Arc::clone(&BUILTIN_CITIES)
    }

    /// The compiled-in city list falling back to `default_jurisdiction`
    /// instead of [`DEFAULT_JURISDICTION`].
    pub fn builtin_with_default(default_jurisdiction: &JurisdictionKey) -> Arc<CityDirectory> {
        if BUILTIN_CITIES.default_jurisdiction() == default_jurisdiction {
            return Self::builtin();
        }
        Arc::new(CityDirectory::new(CITIES.to_vec(), default_jurisdiction.as_str()))
    }

    pub fn default_jurisdiction(&self) -> &JurisdictionKey {
        &self.default_key
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.records
    }

    /// Exact, case-insensitive city lookup.
    pub fn lookup(&self, city: &str) -> Option<&CityRecord> {
        self.by_city
            .get(&city.trim().to_lowercase())
            .map(|&idx| &self.records[idx])
    }

    /// Jurisdiction for a city or state name.
    ///
    /// Tries the city map, then the state-name map, and finally returns
    /// the default jurisdiction with a warning.  Never fails.
    pub fn resolve(&self, name: &str) -> JurisdictionKey {
        self.try_resolve(name).unwrap_or_else(|| self.fallback(name))
    }

    /// Resolves a persisted `"City, State"` selection.
    ///
    /// The city part is tried first (as a city, then as a state), then
    /// the state part as a state name.
    pub fn resolve_selection(&self, selection: &str) -> JurisdictionKey {
        let (city, state) = match selection.split_once(',') {
            Some((city, state)) => (city, Some(state)),
            None => (selection, None),
        };
        self.try_resolve(city)
            .or_else(|| state.and_then(|s| self.state_jurisdiction(s)))
            .unwrap_or_else(|| self.fallback(selection))
    }

    /// Display state for a city, or [`DEFAULT_STATE`] when unknown.
    pub fn state_for_city(&self, city: &str) -> &str {
        self.lookup(city).map_or(DEFAULT_STATE, |r| r.state)
    }

    /// Popular cities in directory order.
    pub fn popular(&self) -> Vec<&CityRecord> {
        self.records.iter().filter(|r| r.popular).collect()
    }

    /// Every city, sorted by name.
    pub fn all_sorted(&self) -> Vec<&CityRecord> {
        let mut all: Vec<_> = self.records.iter().collect();
        all.sort_by(|a, b| a.city.cmp(b.city));
        all
    }

    /// Cities whose city or state name contains `query`, ignoring case,
    /// in directory order and capped at [`SEARCH_LIMIT`].
    pub fn search(&self, query: &str) -> Vec<&CityRecord> {
        let needle = query.trim().to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                r.city.to_lowercase().contains(&needle) || r.state.to_lowercase().contains(&needle)
            })
            .take(SEARCH_LIMIT)
            .collect()
    }

    /// Distinct jurisdictions referenced by the directory.
    pub fn jurisdictions(&self) -> Vec<JurisdictionKey> {
        let mut keys: Vec<_> = self
            .records
            .iter()
            .map(|r| JurisdictionKey::new(r.jurisdiction))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    fn try_resolve(&self, name: &str) -> Option<JurisdictionKey> {
        self.lookup(name)
            .map(|r| JurisdictionKey::new(r.jurisdiction))
            .or_else(|| self.state_jurisdiction(name))
    }

    fn state_jurisdiction(&self, state: &str) -> Option<JurisdictionKey> {
        self.by_state.get(&state.trim().to_lowercase()).cloned()
    }

    fn fallback(&self, name: &str) -> JurisdictionKey {
        tracing::warn!(
            city = name,
            fallback = %self.default_key,
            "city not found in directory, using default jurisdiction"
        );
        self.default_key.clone()
    }
}

static BUILTIN_CITIES: Lazy<Arc<CityDirectory>> =
    Lazy::new(|| Arc::new(CityDirectory::new(CITIES.to_vec(), DEFAULT_JURISDICTION)));

const fn city(city: &'static str, state: &'static str, jurisdiction: &'static str, popular: bool) -> CityRecord {
    CityRecord {
        city,
        state,
        jurisdiction,
        popular,
    }
}

const DELHI: &str = "THE GOV OF NCT OF DELHI (UT)";

static CITIES: &[CityRecord] = &[
    // Delhi NCR
    city("Delhi", "Delhi", DELHI, true),
    city("New Delhi", "Delhi", DELHI, true),
    city("Noida", "Uttar Pradesh", "UTTAR PRADESH", true),
    city("Gurgaon", "Haryana", "HARYANA", true),
    city("Gurugram", "Haryana", "HARYANA", true),
    city("Faridabad", "Haryana", "HARYANA", true),
    city("Ghaziabad", "Uttar Pradesh", "UTTAR PRADESH", true),
    city("Greater Noida", "Uttar Pradesh", "UTTAR PRADESH", false),
    // Maharashtra
    city("Mumbai", "Maharashtra", "MAHARASHTRA", true),
    city("Pune", "Maharashtra", "MAHARASHTRA", true),
    city("Nagpur", "Maharashtra", "MAHARASHTRA", true),
    city("Nashik", "Maharashtra", "MAHARASHTRA", false),
    city("Thane", "Maharashtra", "MAHARASHTRA", false),
    city("Aurangabad", "Maharashtra", "MAHARASHTRA", false),
    city("Solapur", "Maharashtra", "MAHARASHTRA", false),
    city("Kolhapur", "Maharashtra", "MAHARASHTRA", false),
    city("Navi Mumbai", "Maharashtra", "MAHARASHTRA", false),
    // Karnataka
    city("Bangalore", "Karnataka", "KARNATAKA", true),
    city("Bengaluru", "Karnataka", "KARNATAKA", true),
    city("Mysore", "Karnataka", "KARNATAKA", false),
    city("Mangalore", "Karnataka", "KARNATAKA", false),
    city("Hubli", "Karnataka", "KARNATAKA", false),
    city("Belgaum", "Karnataka", "KARNATAKA", false),
    // Tamil Nadu
    city("Chennai", "Tamil Nadu", "TAMIL NADU", true),
    city("Coimbatore", "Tamil Nadu", "TAMIL NADU", false),
    city("Madurai", "Tamil Nadu", "TAMIL NADU", false),
    city("Tiruchirappalli", "Tamil Nadu", "TAMIL NADU", false),
    city("Salem", "Tamil Nadu", "TAMIL NADU", false),
    city("Tirunelveli", "Tamil Nadu", "TAMIL NADU", false),
    // Telangana
    city("Hyderabad", "Telangana", "TELANGANA", true),
    city("Warangal", "Telangana", "TELANGANA", false),
    city("Nizamabad", "Telangana", "TELANGANA", false),
    // Andhra Pradesh
    city("Visakhapatnam", "Andhra Pradesh", "ANDHRA PRADESH", false),
    city("Vijayawada", "Andhra Pradesh", "ANDHRA PRADESH", false),
    city("Guntur", "Andhra Pradesh", "ANDHRA PRADESH", false),
    city("Tirupati", "Andhra Pradesh", "ANDHRA PRADESH", false),
    // West Bengal
    city("Kolkata", "West Bengal", "WEST BENGAL", true),
    city("Howrah", "West Bengal", "WEST BENGAL", false),
    city("Durgapur", "West Bengal", "WEST BENGAL", false),
    city("Asansol", "West Bengal", "WEST BENGAL", false),
    city("Siliguri", "West Bengal", "WEST BENGAL", false),
    // Gujarat
    city("Ahmedabad", "Gujarat", "GUJARAT", true),
    city("Surat", "Gujarat", "GUJARAT", true),
    city("Vadodara", "Gujarat", "GUJARAT", false),
    city("Rajkot", "Gujarat", "GUJARAT", false),
    city("Gandhinagar", "Gujarat", "GUJARAT", false),
    // Rajasthan
    city("Jaipur", "Rajasthan", "RAJASTHAN", true),
    city("Jodhpur", "Rajasthan", "RAJASTHAN", false),
    city("Udaipur", "Rajasthan", "RAJASTHAN", false),
    city("Kota", "Rajasthan", "RAJASTHAN", false),
    city("Ajmer", "Rajasthan", "RAJASTHAN", false),
    // Uttar Pradesh
    city("Lucknow", "Uttar Pradesh", "UTTAR PRADESH", true),
    city("Kanpur", "Uttar Pradesh", "UTTAR PRADESH", false),
    city("Agra", "Uttar Pradesh", "UTTAR PRADESH", false),
    city("Varanasi", "Uttar Pradesh", "UTTAR PRADESH", false),
    city("Meerut", "Uttar Pradesh", "UTTAR PRADESH", false),
    city("Allahabad", "Uttar Pradesh", "UTTAR PRADESH", false),
    city("Prayagraj", "Uttar Pradesh", "UTTAR PRADESH", false),
    // Madhya Pradesh
    city("Indore", "Madhya Pradesh", "MADHYA PRADESH", true),
    city("Bhopal", "Madhya Pradesh", "MADHYA PRADESH", true),
    city("Jabalpur", "Madhya Pradesh", "MADHYA PRADESH", false),
    city("Gwalior", "Madhya Pradesh", "MADHYA PRADESH", false),
    city("Ujjain", "Madhya Pradesh", "MADHYA PRADESH", false),
    // Punjab and Chandigarh
    city("Chandigarh", "Chandigarh", "CHANDIGARH (UT)", true),
    city("Ludhiana", "Punjab", "PUNJAB", false),
    city("Amritsar", "Punjab", "PUNJAB", false),
    city("Jalandhar", "Punjab", "PUNJAB", false),
    city("Patiala", "Punjab", "PUNJAB", false),
    // Haryana
    city("Panipat", "Haryana", "HARYANA", false),
    city("Ambala", "Haryana", "HARYANA", false),
    city("Rohtak", "Haryana", "HARYANA", false),
    city("Hisar", "Haryana", "HARYANA", false),
    // Kerala
    city("Kochi", "Kerala", "KERALA", true),
    city("Thiruvananthapuram", "Kerala", "KERALA", false),
    city("Kozhikode", "Kerala", "KERALA", false),
    city("Thrissur", "Kerala", "KERALA", false),
    // Bihar
    city("Patna", "Bihar", "BIHAR", true),
    city("Gaya", "Bihar", "BIHAR", false),
    city("Bhagalpur", "Bihar", "BIHAR", false),
    city("Muzaffarpur", "Bihar", "BIHAR", false),
    // Odisha
    city("Bhubaneswar", "Odisha", "ODISHA", true),
    city("Cuttack", "Odisha", "ODISHA", false),
    city("Rourkela", "Odisha", "ODISHA", false),
    // Jharkhand
    city("Ranchi", "Jharkhand", "JHARKHAND", false),
    city("Jamshedpur", "Jharkhand", "JHARKHAND", false),
    city("Dhanbad", "Jharkhand", "JHARKHAND", false),
    // Chhattisgarh
    city("Raipur", "Chhattisgarh", "CHHATTISGARH", false),
    city("Bhilai", "Chhattisgarh", "CHHATTISGARH", false),
    // Uttarakhand
    city("Dehradun", "Uttarakhand", "UTTARAKHAND", false),
    city("Haridwar", "Uttarakhand", "UTTARAKHAND", false),
    // Himachal Pradesh
    city("Shimla", "Himachal Pradesh", "HIMACHAL PRADESH", false),
    city("Manali", "Himachal Pradesh", "HIMACHAL PRADESH", false),
    // Jammu & Kashmir
    city("Srinagar", "Jammu & Kashmir", "JAMMU & KASHMIR (UT)", false),
    city("Jammu", "Jammu & Kashmir", "JAMMU & KASHMIR (UT)", false),
    // Assam
    city("Guwahati", "Assam", "ASSAM", false),
    city("Dibrugarh", "Assam", "ASSAM", false),
    // Goa
    city("Panaji", "Goa", "GOA", false),
    city("Margao", "Goa", "GOA", false),
    // Puducherry
    city("Puducherry", "Puducherry", "PUDUCHERRY (UT)", false),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::TariffTable;

    #[test]
    fn resolves_cities_case_insensitively() {
        let dir = CityDirectory::builtin();
        assert_eq!(dir.resolve("Mumbai").as_str(), "MAHARASHTRA");
        assert_eq!(dir.resolve("mUmBaI").as_str(), "MAHARASHTRA");
        assert_eq!(dir.resolve("new delhi").as_str(), "THE GOV OF NCT OF DELHI (UT)");
        assert_eq!(dir.resolve("Gurugram").as_str(), "HARYANA");
    }

    #[test]
    fn falls_back_to_state_names() {
        let dir = CityDirectory::builtin();
        assert_eq!(dir.resolve("Kerala").as_str(), "KERALA");
        assert_eq!(dir.resolve("JAMMU & KASHMIR").as_str(), "JAMMU & KASHMIR (UT)");
        assert_eq!(dir.resolve("tamil nadu").as_str(), "TAMIL NADU");
    }

    #[test]
    fn unknown_city_resolves_to_default() {
        let dir = CityDirectory::builtin();
        assert_eq!(dir.resolve("Nowhereville").as_str(), DEFAULT_JURISDICTION);
        assert_eq!(dir.resolve("").as_str(), DEFAULT_JURISDICTION);
    }

    #[test]
    fn builtin_list_can_use_another_default() {
        let dir = CityDirectory::builtin_with_default(&JurisdictionKey::new("goa"));
        assert_eq!(dir.resolve("Nowhereville").as_str(), "GOA");
        assert_eq!(dir.resolve("Mumbai").as_str(), "MAHARASHTRA");
        assert_eq!(dir.records().len(), CITIES.len());

        let same = CityDirectory::builtin_with_default(&JurisdictionKey::new(DEFAULT_JURISDICTION));
        assert!(Arc::ptr_eq(&same, &CityDirectory::builtin()));
    }

    #[test]
    fn every_city_jurisdiction_has_a_tariff_row() {
        let dir = CityDirectory::builtin();
        let table = TariffTable::builtin();
        for key in dir.jurisdictions() {
            assert!(table.contains(&key), "{key} missing from tariff table");
        }
    }

    #[test]
    fn first_record_wins_for_duplicate_names() {
        let dir = CityDirectory::new(
            vec![
                city("Aurangabad", "Maharashtra", "MAHARASHTRA", false),
                city("Aurangabad", "Bihar", "BIHAR", false),
            ],
            "MAHARASHTRA",
        );
        assert_eq!(dir.resolve("Aurangabad").as_str(), "MAHARASHTRA");
        assert_eq!(dir.state_for_city("aurangabad"), "Maharashtra");
    }

    #[test]
    fn selection_prefers_city_then_state() {
        let dir = CityDirectory::builtin();
        assert_eq!(dir.resolve_selection("Kochi, Kerala").as_str(), "KERALA");
        assert_eq!(dir.resolve_selection("Smalltown, Gujarat").as_str(), "GUJARAT");
        assert_eq!(dir.resolve_selection("Delhi, Delhi").as_str(), "THE GOV OF NCT OF DELHI (UT)");
        assert_eq!(dir.resolve_selection("Pune").as_str(), "MAHARASHTRA");
        assert_eq!(dir.resolve_selection("Smalltown, Atlantis").as_str(), DEFAULT_JURISDICTION);
    }

    #[test]
    fn state_for_unknown_city_is_default_state() {
        let dir = CityDirectory::builtin();
        assert_eq!(dir.state_for_city("Kolkata"), "West Bengal");
        assert_eq!(dir.state_for_city("Nowhereville"), DEFAULT_STATE);
    }

    #[test]
    fn popular_and_sorted_listings() {
        let dir = CityDirectory::builtin();
        let popular = dir.popular();
        assert!(popular.iter().all(|r| r.popular));
        assert_eq!(popular[0].city, "Delhi");

        let sorted = dir.all_sorted();
        assert_eq!(sorted.len(), dir.records().len());
        assert!(sorted.windows(2).all(|w| w[0].city <= w[1].city));
        assert_eq!(sorted[0].city, "Agra");
    }

    #[test]
    fn search_matches_city_or_state_and_caps_results() {
        let dir = CityDirectory::builtin();
        let hits = dir.search("bad");
        assert!(hits.iter().any(|r| r.city == "Hyderabad"));
        assert!(hits.iter().any(|r| r.city == "Ghaziabad"));

        let by_state = dir.search("uttar pradesh");
        assert_eq!(by_state.len(), SEARCH_LIMIT);
        assert!(by_state.iter().all(|r| r.state == "Uttar Pradesh"));
    }
}
