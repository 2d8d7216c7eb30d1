// Display formatting for localized amounts (en-US conventions).
use shared::Strategy;

/// Currencies shown without minor units.
pub const ZERO_DECIMAL_CURRENCIES: [&str; 7] = ["JPY", "KRW", "VND", "IDR", "CLP", "COP", "HUF"];

fn symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "GBP" => "£",
        "EUR" => "€",
        "JPY" => "¥",
        "CAD" => "CA$",
        "AUD" => "A$",
        "CNY" => "CN¥",
        "INR" => "₹",
        "BRL" => "R$",
        "KRW" => "₩",
        "MXN" => "MX$",
        "NZD" => "NZ$",
        "HKD" => "HK$",
        "TWD" => "NT$",
        "ILS" => "₪",
        "VND" => "₫",
        "PHP" => "₱",
        _ => return None,
    };
    Some(symbol)
}

fn is_well_formed_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn fraction_digits(currency: &str) -> usize {
    if ZERO_DECIMAL_CURRENCIES.contains(&currency) {
        0
    } else {
        2
    }
}

// `{:.N}` alone rounds exact ties to even; amounts round ties away from zero.
fn round_half_away(value: f64, digits: usize) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// "1234567.89" -> "1,234,567.89"
fn group_thousands(number: &str) -> String {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (number, None),
    };
    let mut grouped = String::with_capacity(number.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Formats an amount in `currency`. Non-finite amounts render as "N/A";
/// a malformed currency code falls back to "CODE 12.34". Ties round away
/// from zero.
pub fn format_amount(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return "N/A".to_string();
    }
    if !is_well_formed_code(currency) {
        return format!("{} {:.2}", currency, amount);
    }
    let code = currency.to_ascii_uppercase();
    let digits = fraction_digits(&code);
    let number = group_thousands(&format!("{:.*}", digits, round_half_away(amount.abs(), digits)));
    let sign = if amount < 0.0 { "-" } else { "" };
    match symbol(&code) {
        Some(sym) => format!("{}{}{}", sign, sym, number),
        None => format!("{}{} {}", sign, code, number),
    }
}

pub fn format_ratio(ratio: f64) -> String {
    if ratio.is_finite() {
        format!("{:.4}", ratio)
    } else {
        "N/A".to_string()
    }
}

/// Grid cell text for a computed value.
pub fn format_value(value: Option<f64>, strategy: Strategy, currency: &str) -> String {
    match value {
        None => "N/A".to_string(),
        Some(v) if strategy == Strategy::Ratio && v.is_finite() => format!("{:.2}×", v),
        Some(v) => format_amount(v, currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_with_symbols() {
        assert_eq!(format_amount(32.543497, "GBP"), "£32.54");
        assert_eq!(format_amount(32.99, "GBP"), "£32.99");
        assert_eq!(format_amount(1234.5, "USD"), "$1,234.50");
        assert_eq!(format_amount(49.0, "CAD"), "CA$49.00");
    }

    #[test]
    fn test_zero_decimal_currencies() {
        assert_eq!(format_amount(4628.67, "JPY"), "¥4,629");
        assert_eq!(format_amount(1234567.0, "IDR"), "IDR 1,234,567");
        assert_eq!(format_amount(8588.4, "HUF"), "HUF 8,588");
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(format_amount(0.125, "USD"), "$0.13");
        assert_eq!(format_amount(2.5, "JPY"), "¥3");
        assert_eq!(format_amount(-0.125, "USD"), "-$0.13");
        assert_eq!(format_amount(0.124, "USD"), "$0.12");
    }

    #[test]
    fn test_code_without_symbol() {
        assert_eq!(format_amount(46.49, "CHF"), "CHF 46.49");
        assert_eq!(format_amount(10.0, "chf"), "CHF 10.00");
    }

    #[test]
    fn test_malformed_code_falls_back() {
        assert_eq!(format_amount(3.14159, "EURO"), "EURO 3.14");
        assert_eq!(format_amount(2.0, "$"), "$ 2.00");
    }

    #[test]
    fn test_non_finite_is_na() {
        assert_eq!(format_amount(f64::NAN, "USD"), "N/A");
        assert_eq!(format_amount(f64::INFINITY, "USD"), "N/A");
        assert_eq!(format_ratio(f64::NAN), "N/A");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("123456.78"), "123,456.78");
    }

    #[test]
    fn test_format_value_by_strategy() {
        assert_eq!(format_value(None, Strategy::Lazy, "GBP"), "N/A");
        assert_eq!(format_value(Some(0.664153), Strategy::Ratio, "GBP"), "0.66×");
        assert_eq!(format_value(Some(32.99), Strategy::Final, "GBP"), "£32.99");
        assert_eq!(format_ratio(0.664153), "0.6642");
    }
}
