// Country reference table with World Bank PPP conversion factors
// (WDI PA.NUS.PPP, local currency units per international dollar).
use crate::models::Country;

const fn country(iso3: &'static str, iso2: &'static str, name: &'static str, currency: &'static str, ppp: f64) -> Country {
    Country { iso3, iso2, name, currency, ppp, estimated: false }
}

pub static COUNTRIES: [Country; 47] = [
    country("USA", "US", "United States", "USD", 1.000),
    country("GBR", "GB", "United Kingdom", "GBP", 0.664153),
    country("DEU", "DE", "Germany", "EUR", 0.700862),
    country("FRA", "FR", "France", "EUR", 0.681239),
    country("ITA", "IT", "Italy", "EUR", 0.599627),
    country("ESP", "ES", "Spain", "EUR", 0.562107),
    country("NLD", "NL", "Netherlands", "EUR", 0.731421),
    country("JPN", "JP", "Japan", "JPY", 94.4626),
    country("CAN", "CA", "Canada", "CAD", 1.150472),
    country("AUS", "AU", "Australia", "AUD", 1.366527),
    country("CHE", "CH", "Switzerland", "CHF", 0.948875),
    country("CHN", "CN", "China", "CNY", 3.532549),
    country("IND", "IN", "India", "INR", 20.4220),
    country("BRA", "BR", "Brazil", "BRL", 2.487317),
    country("KOR", "KR", "South Korea", "KRW", 809.267),
    country("MEX", "MX", "Mexico", "MXN", 9.916562),
    country("IDN", "ID", "Indonesia", "IDR", 4747.909),
    country("TUR", "TR", "Turkey", "TRY", 11.42387),
    country("SWE", "SE", "Sweden", "SEK", 8.490485),
    country("NOR", "NO", "Norway", "NOK", 9.142143),
    country("DNK", "DK", "Denmark", "DKK", 6.050211),
    country("POL", "PL", "Poland", "PLN", 1.949414),
    country("ZAF", "ZA", "South Africa", "ZAR", 7.431913),
    country("MYS", "MY", "Malaysia", "MYR", 1.401327),
    country("THA", "TH", "Thailand", "THB", 10.49237),
    country("SGP", "SG", "Singapore", "SGD", 0.804050),
    country("NZL", "NZ", "New Zealand", "NZD", 1.463912),
    country("SAU", "SA", "Saudi Arabia", "SAR", 1.845262),
    country("ARE", "AE", "UAE", "AED", 2.330334),
    country("PHL", "PH", "Philippines", "PHP", 19.35653),
    country("VNM", "VN", "Vietnam", "VND", 6956.928),
    country("EGY", "EG", "Egypt", "EGP", 6.247820),
    country("ARG", "AR", "Argentina", "ARS", 419.901),
    country("RUS", "RU", "Russia", "RUB", 29.06297),
    country("NGA", "NG", "Nigeria", "NGN", 176.331),
    country("HKG", "HK", "Hong Kong", "HKD", 5.611867),
    // Not covered by the World Bank; the factor is an estimate.
    Country { iso3: "TWN", iso2: "TW", name: "Taiwan", currency: "TWD", ppp: 15.8, estimated: true },
    country("ISR", "IL", "Israel", "ILS", 3.501980),
    country("CHL", "CL", "Chile", "CLP", 435.779),
    country("COL", "CO", "Colombia", "COP", 1443.719),
    country("HUN", "HU", "Hungary", "HUF", 175.578),
    country("CZE", "CZ", "Czech Republic", "CZK", 12.82323),
    country("ROU", "RO", "Romania", "RON", 1.863182),
    country("MAR", "MA", "Morocco", "MAD", 3.964540),
    country("KEN", "KE", "Kenya", "KES", 43.27129),
    country("PAK", "PK", "Pakistan", "PKR", 66.95915),
    country("BGD", "BD", "Bangladesh", "BDT", 29.87879),
];

pub fn all() -> &'static [Country] {
    &COUNTRIES
}

pub fn default_home() -> &'static Country {
    &COUNTRIES[0]
}

pub fn by_iso3(iso3: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.iso3.eq_ignore_ascii_case(iso3))
}

/// First entry in table order using `currency`.
pub fn first_for_currency(currency: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.currency.eq_ignore_ascii_case(currency))
}

pub fn sharing_currency(currency: &str) -> Vec<&'static Country> {
    COUNTRIES.iter().filter(|c| c.currency.eq_ignore_ascii_case(currency)).collect()
}

/// One representative country per distinct currency, in table order.
pub fn unique_currency_countries() -> Vec<&'static Country> {
    COUNTRIES
        .iter()
        .enumerate()
        .filter(|(i, c)| COUNTRIES.iter().position(|x| x.currency == c.currency) == Some(*i))
        .map(|(_, c)| c)
        .collect()
}

/// Home first, then every other country in table order.
pub fn home_first(home: &Country) -> Vec<&'static Country> {
    let mut ordered: Vec<&'static Country> = Vec::with_capacity(COUNTRIES.len());
    if let Some(h) = by_iso3(home.iso3) {
        ordered.push(h);
    }
    ordered.extend(COUNTRIES.iter().filter(|c| c.iso3 != home.iso3));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_iso3_codes_are_unique() {
        let codes: HashSet<_> = COUNTRIES.iter().map(|c| c.iso3).collect();
        assert_eq!(codes.len(), COUNTRIES.len());
    }

    #[test]
    fn test_all_ppp_factors_positive() {
        assert!(COUNTRIES.iter().all(|c| c.ppp > 0.0 && c.ppp.is_finite()));
    }

    #[test]
    fn test_only_taiwan_is_estimated() {
        let estimated: Vec<_> = COUNTRIES.iter().filter(|c| c.estimated).map(|c| c.iso3).collect();
        assert_eq!(estimated, vec!["TWN"]);
    }

    #[test]
    fn test_first_for_currency_uses_table_order() {
        assert_eq!(first_for_currency("EUR").unwrap().iso3, "DEU");
        assert_eq!(first_for_currency("usd").unwrap().iso3, "USA");
        assert!(first_for_currency("XXX").is_none());
    }

    #[test]
    fn test_unique_currency_countries_skips_eurozone_duplicates() {
        let unique = unique_currency_countries();
        let eur: Vec<_> = unique.iter().filter(|c| c.currency == "EUR").collect();
        assert_eq!(eur.len(), 1);
        assert_eq!(eur[0].iso3, "DEU");
        assert_eq!(unique.len(), COUNTRIES.len() - 4);
    }

    #[test]
    fn test_home_first_ordering() {
        let home = by_iso3("FRA").unwrap();
        let ordered = home_first(home);
        assert_eq!(ordered.len(), COUNTRIES.len());
        assert_eq!(ordered[0].iso3, "FRA");
        assert_eq!(ordered[1].iso3, "USA");
        assert_eq!(ordered.iter().filter(|c| c.iso3 == "FRA").count(), 1);
    }
}
