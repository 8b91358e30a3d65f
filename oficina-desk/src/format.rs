//! Display formatters
//!
//! Brazilian conventions: `R$ 1.234,56` for money, `dd/mm/yyyy` for dates,
//! masked CPF / CNPJ documents. Parsers accept both the local form and the
//! plain machine form so values pasted from either side round-trip.

use chrono::NaiveDate;
use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

/// Round a monetary value to cents (half away from zero)
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

// ========== Money ==========

/// Format a value as BRL currency: `R$ 1.234,56`
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_money(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}R$ {}", format_number(rounded.abs()))
}

/// Format a non-negative amount with `.` thousands and `,` decimals
fn format_number(value: Decimal) -> String {
    let plain = format!("{:.2}", value);
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{grouped},{frac_part}")
}

/// Parse a money input.
///
/// Accepts `1.234,56`, `1234,56`, `1234.56` and an optional `R$` prefix.
/// Returns `None` for blank or malformed input.
pub fn parse_money(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        // Local form: dots group thousands, comma marks decimals
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.matches('.').count() > 1 {
        cleaned.replace('.', "")
    } else {
        cleaned
    };
    Decimal::from_str(&normalized).ok()
}

/// Format a percentage: `10%`, `12,5%`
pub fn format_percentage(value: Decimal) -> String {
    let normalized = round_money(value).normalize();
    format!("{}%", normalized.to_string().replace('.', ","))
}

// ========== Dates ==========

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/mm/yyyy`, or `-` when absent
pub fn format_date_opt(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_else(|| "-".to_string())
}

/// Value for a date input field (`YYYY-MM-DD`, empty when absent)
pub fn to_date_input(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Read a date input field.
///
/// Accepts `YYYY-MM-DD`, ISO timestamps and `dd/mm/yyyy`.
pub fn from_date_input(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    shared::util::parse_calendar_date(input)
        .or_else(|| NaiveDate::parse_from_str(input, "%d/%m/%Y").ok())
}

// ========== Identifiers ==========

/// Zero-padded order number: `OS 000042`
pub fn format_order_number(number: i64) -> String {
    format!("OS {:06}", number)
}

/// Mask a CPF (11 digits) or CNPJ (14 digits); other inputs are returned trimmed
pub fn format_document(document: &str) -> String {
    let digits: String = document.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!(
            "{}.{}.{}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..11]
        ),
        14 => format!(
            "{}.{}.{}/{}-{}",
            &digits[0..2],
            &digits[2..5],
            &digits[5..8],
            &digits[8..12],
            &digits[12..14]
        ),
        _ => document.trim().to_string(),
    }
}

/// Mask a Brazilian phone number: `(11) 98765-4321` / `(11) 3456-7890`
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[0..2], &digits[2..7], &digits[7..11]),
        10 => format!("({}) {}-{}", &digits[0..2], &digits[2..6], &digits[6..10]),
        _ => phone.trim().to_string(),
    }
}
