//! Field-value normalization helpers.
//!
//! All pure and lenient: bad input degrades to an empty/zero value, never an
//! error. All idempotent — normalizing an already-normalized value returns
//! it unchanged.

use std::sync::OnceLock;

use regex::Regex;

fn non_digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\D").unwrap())
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[$,]").unwrap())
}

fn month_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+)-(\d{2})$").unwrap())
}

/// Strip everything but digits from a phone number.
pub fn normalize_phone(phone: &str) -> String {
    non_digit_re().replace_all(phone, "").into_owned()
}

/// Strip `$` and `,` from a currency value. Empty input becomes `"0"`.
pub fn normalize_currency(value: &str) -> String {
    let cleaned = currency_re().replace_all(value.trim(), "").into_owned();
    if cleaned.is_empty() {
        "0".to_string()
    } else {
        cleaned
    }
}

/// Parse a normalized currency value as a whole-dollar amount.
///
/// Truncates any cents; unparsable input is 0.
pub fn currency_amount(value: &str) -> i64 {
    let normalized = normalize_currency(value);
    normalized
        .split('.')
        .next()
        .unwrap_or("0")
        .parse()
        .unwrap_or(0)
}

/// Drop a trailing `.0` from a monthly-payment figure exported as a float.
pub fn normalize_payment(value: &str) -> String {
    value
        .trim()
        .strip_suffix(".0")
        .unwrap_or(value.trim())
        .to_string()
}

/// Convert a sheet-exported `Month-YY` date (e.g. `September-19`) to
/// `MM/01/YYYY`. Anything else passes through untouched.
pub fn parse_sheet_date(date: &str) -> String {
    let Some(caps) = month_year_re().captures(date) else {
        return date.to_string();
    };

    let month = match &caps[1] {
        "January" => "01",
        "February" => "02",
        "March" => "03",
        "April" => "04",
        "May" => "05",
        "June" => "06",
        "July" => "07",
        "August" => "08",
        "September" => "09",
        "October" => "10",
        "November" => "11",
        "December" => "12",
        _ => return date.to_string(),
    };

    format!("{}/01/20{}", month, &caps[2])
}
