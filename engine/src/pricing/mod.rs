// Pricing engine: localizes a base price for a target country.
pub mod currency_format;

use shared::{Country, Strategy};
use std::collections::HashMap;

pub use currency_format::{format_amount, format_ratio, format_value};

/// Target currency code -> units of that currency per one unit of the base.
pub type Rates = HashMap<String, f64>;

pub const PSYCHOLOGICAL_FLOOR: f64 = 0.99;

/// Purchasing-power ratio, target per home.
pub fn ppp_ratio(home: &Country, target: &Country) -> f64 {
    target.ppp / home.ppp
}

/// Ends every price in .99 and never goes below 0.99.
pub fn psychological_round(price: f64) -> f64 {
    if price < 1.0 {
        PSYCHOLOGICAL_FLOOR
    } else {
        price.floor() + PSYCHOLOGICAL_FLOOR
    }
}

/// Localized value for one country. `None` means the value is unavailable,
/// which only happens for [`Strategy::Lazy`] without a rate for the target.
pub fn compute_value(
    base_price: f64,
    home: &Country,
    target: &Country,
    rates: Option<&Rates>,
    strategy: Strategy,
) -> Option<f64> {
    let ratio = ppp_ratio(home, target);
    match strategy {
        Strategy::Lazy => rates
            .and_then(|r| r.get(target.currency))
            .map(|rate| base_price * rate),
        Strategy::Ratio => Some(ratio),
        Strategy::Ppp => Some(base_price * ratio),
        Strategy::Final => Some(psychological_round(base_price * ratio)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::countries;

    fn country(iso3: &str) -> &'static Country {
        countries::by_iso3(iso3).unwrap()
    }

    fn usd_rates() -> Rates {
        Rates::from([("GBP".to_string(), 0.79), ("USD".to_string(), 1.0)])
    }

    #[test]
    fn test_ratio_is_one_for_same_country() {
        for c in countries::all() {
            assert_eq!(compute_value(10.0, c, c, None, Strategy::Ratio), Some(1.0));
        }
    }

    #[test]
    fn test_ppp_power_scenario() {
        let value = compute_value(49.0, country("USA"), country("GBR"), None, Strategy::Ppp).unwrap();
        assert!((value - 32.543497).abs() < 1e-6);
    }

    #[test]
    fn test_final_scenario() {
        let value = compute_value(49.0, country("USA"), country("GBR"), None, Strategy::Final).unwrap();
        assert!((value - 32.99).abs() < 1e-9);
    }

    #[test]
    fn test_final_always_ends_in_99() {
        let home = country("USA");
        for price in [0.01, 0.5, 1.0, 3.7, 49.0, 999.99, 12345.0] {
            for target in countries::all() {
                let value = compute_value(price, home, target, None, Strategy::Final).unwrap();
                let ppp = price * ppp_ratio(home, target);
                if ppp < 1.0 {
                    assert_eq!(value, 0.99);
                } else {
                    let cents = ((value - value.floor()) * 100.0).round();
                    assert_eq!(cents, 99.0, "{} in {} gave {}", price, target.iso3, value);
                }
            }
        }
    }

    #[test]
    fn test_lazy_needs_rates() {
        let (home, target) = (country("USA"), country("GBR"));
        assert_eq!(compute_value(10.0, home, target, None, Strategy::Lazy), None);
        let rates = usd_rates();
        let value = compute_value(10.0, home, target, Some(&rates), Strategy::Lazy).unwrap();
        assert!((value - 7.9).abs() < 1e-9);
        // no JPY entry in the table
        assert_eq!(compute_value(10.0, home, country("JPN"), Some(&rates), Strategy::Lazy), None);
    }

    #[test]
    fn test_psychological_round_floor() {
        assert_eq!(psychological_round(0.2), 0.99);
        assert_eq!(psychological_round(0.999), 0.99);
        assert_eq!(psychological_round(1.0), 1.99);
    }
}
