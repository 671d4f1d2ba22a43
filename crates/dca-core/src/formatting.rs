use chrono::{Datelike, NaiveDate};

use crate::time_utils::{resolve_timezone, TimezoneHandler};

/// Satoshis in one bitcoin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use dca_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a scaled epsilon so exact binary midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50".
        let decimal_digits = &frac_str[1..];
        format!("{}{}", grouped, decimal_digits)
    };

    if negative && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a sats amount for display.
///
/// ```
/// use dca_core::formatting::format_sats;
///
/// assert_eq!(format_sats(1_234_567), "1,234,567 sats");
/// assert_eq!(format_sats(0), "0 sats");
/// ```
pub fn format_sats(amount: u64) -> String {
    format!("{} sats", group_thousands(&amount.to_string()))
}

/// Format a sats amount as whole bitcoin with eight decimals.
///
/// ```
/// use dca_core::formatting::format_btc;
///
/// assert_eq!(format_btc(12_345), "0.00012345 BTC");
/// assert_eq!(format_btc(150_000_000), "1.50000000 BTC");
/// ```
pub fn format_btc(sats: u64) -> String {
    let whole = sats / SATS_PER_BTC;
    let frac = sats % SATS_PER_BTC;
    format!("{}.{:08} BTC", group_thousands(&whole.to_string()), frac)
}

/// Format a centavo amount as quetzales.
///
/// Zero renders as the `"Q 0.00"` placeholder the dashboard has always shown.
///
/// ```
/// use dca_core::formatting::format_centavos;
///
/// assert_eq!(format_centavos(123_456), "Q1,234.56");
/// assert_eq!(format_centavos(0), "Q 0.00");
/// assert_eq!(format_centavos(-1_200), "-Q12.00");
/// ```
pub fn format_centavos(centavos: i64) -> String {
    if centavos == 0 {
        return "Q 0.00".to_string();
    }
    format_gtq(centavos as f64 / 100.0)
}

/// Format a quetzal amount (already converted from centavos).
pub fn format_gtq(amount: f64) -> String {
    if amount < 0.0 {
        format!("-Q{}", format_number(amount.abs(), 2))
    } else {
        format!("Q{}", format_number(amount, 2))
    }
}

/// Format an exchange rate (sats per quetzal).
pub fn format_exchange_rate(rate: f64) -> String {
    format!("{} sats/Q", format_number(rate, 2))
}

/// Short chart label, e.g. `"Jan 1"`.
pub fn format_short_date(date: NaiveDate) -> String {
    format!("{} {}", date.format("%b"), date.day())
}

/// Calendar date of a server timestamp in `display_tz`, as `M/D/YYYY`.
///
/// Naive timestamps are taken to be UTC. Empty or unparseable input yields
/// an empty string.
pub fn format_date(timestamp: &str, display_tz: &str) -> String {
    let handler = TimezoneHandler::new("UTC");
    match handler.parse_timestamp(timestamp) {
        Some(dt) => {
            let local = dt.with_timezone(&resolve_timezone(display_tz));
            format!("{}/{}/{}", local.month(), local.day(), local.year())
        }
        None => String::new(),
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_number_rounds_up() {
        assert_eq!(format_number(1.005, 2), "1.01");
    }

    // ── format_sats ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_sats() {
        assert_eq!(format_sats(0), "0 sats");
        assert_eq!(format_sats(999), "999 sats");
        assert_eq!(format_sats(1_000), "1,000 sats");
        assert_eq!(format_sats(100_000_000), "100,000,000 sats");
    }

    // ── format_btc ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_btc() {
        assert_eq!(format_btc(0), "0.00000000 BTC");
        assert_eq!(format_btc(1), "0.00000001 BTC");
        assert_eq!(format_btc(100_000_000), "1.00000000 BTC");
        assert_eq!(format_btc(2_100_000_000_000_000), "21,000,000.00000000 BTC");
    }

    // ── format_centavos / format_gtq ─────────────────────────────────────────

    #[test]
    fn test_format_centavos() {
        assert_eq!(format_centavos(0), "Q 0.00");
        assert_eq!(format_centavos(5), "Q0.05");
        assert_eq!(format_centavos(10_000), "Q100.00");
        assert_eq!(format_centavos(123_456_789), "Q1,234,567.89");
    }

    #[test]
    fn test_format_centavos_negative() {
        assert_eq!(format_centavos(-1_200), "-Q12.00");
    }

    #[test]
    fn test_format_gtq() {
        assert_eq!(format_gtq(1_500.5), "Q1,500.50");
        assert_eq!(format_gtq(0.0), "Q0.00");
    }

    #[test]
    fn test_format_exchange_rate() {
        assert_eq!(format_exchange_rate(1_234.567), "1,234.57 sats/Q");
    }

    // ── dates ────────────────────────────────────────────────────────────────

    #[test]
    fn test_format_short_date() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_short_date(d), "Jan 1");
        let d = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(format_short_date(d), "Dec 25");
    }

    #[test]
    fn test_format_date_utc() {
        assert_eq!(format_date("2024-01-15T10:30:00", "UTC"), "1/15/2024");
        assert_eq!(format_date("2024-01-15T10:30:00Z", "UTC"), "1/15/2024");
    }

    #[test]
    fn test_format_date_shifts_into_display_timezone() {
        // 03:00 UTC is the previous evening in Guatemala (UTC-6).
        assert_eq!(
            format_date("2024-01-15T03:00:00Z", "America/Guatemala"),
            "1/14/2024"
        );
    }

    #[test]
    fn test_format_date_empty_or_invalid() {
        assert_eq!(format_date("", "UTC"), "");
        assert_eq!(format_date("yesterday", "UTC"), "");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        let p = percentage(50.0, 200.0, 1);
        assert!((p - 25.0).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_percentage_rounding() {
        let p = percentage(1.0, 3.0, 2);
        assert!((p - 33.33).abs() < 1e-2, "percentage = {p}");
    }
}
