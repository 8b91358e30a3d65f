//! Input validation helpers
//!
//! Validators never fail with an error type: they return a [`FieldErrors`]
//! map (field name -> messages) that the form renders next to each input.
//! An empty map means the input is valid.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{UserCreate, UserUpdate};
use shared::order::PaymentType;

// ── Limits ──────────────────────────────────────────────────────────

/// Installments allowed for `INSTALLMENT` payments
pub const MIN_INSTALLMENTS: u8 = 1;
pub const MAX_INSTALLMENTS: u8 = 12;

/// Invoice numbers an order may carry
pub const MAX_INVOICE_NUMBERS: usize = 3;

/// Free-text fields (observations, reported defect, conditions)
pub const MAX_NOTE_LEN: usize = 2000;

/// Short text fields (equipment, model, brand, serial number)
pub const MAX_SHORT_TEXT_LEN: usize = 200;

/// Largest unit value, discount or addition of one item (1 billion)
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest quantity of one item
pub const MAX_ITEM_QUANTITY: i32 = 10_000;

/// Minimum password length for new or changed passwords
pub const MIN_PASSWORD_LEN: usize = 6;

// ── Field errors ────────────────────────────────────────────────────

/// Field-level validation messages, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages for one field (empty when the field is valid)
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First message of a field, as shown under the input
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Merge server-side field messages into this set
    pub fn extend_from(&mut self, other: &BTreeMap<String, Vec<String>>) {
        for (field, messages) in other {
            for message in messages {
                self.add(field, message.clone());
            }
        }
    }

    /// `Ok(())` when empty, otherwise the errors themselves
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

// ── Primitive checks ────────────────────────────────────────────────

/// Required text: non-empty after trim and within `max_len` characters
pub fn check_required_text(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "is required");
    } else if value.chars().count() > max_len {
        errors.add(field, format!("must be at most {max_len} characters"));
    }
}

/// Optional text: within `max_len` characters when present
pub fn check_optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) {
    if let Some(v) = value
        && v.trim().chars().count() > max_len
    {
        errors.add(field, format!("must be at most {max_len} characters"));
    }
}

/// Monetary input within `0..=MAX_MONEY`
pub fn check_amount(errors: &mut FieldErrors, field: &str, value: Decimal) {
    if value.is_sign_negative() && !value.is_zero() {
        errors.add(field, "must not be negative");
    } else if value > MAX_MONEY {
        errors.add(field, format!("must be at most {MAX_MONEY}"));
    }
}

/// Percentage within 0-100
pub fn check_percentage(errors: &mut FieldErrors, field: &str, value: Decimal) {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        errors.add(field, "must be between 0 and 100");
    }
}

pub fn check_installments(
    errors: &mut FieldErrors,
    payment_type: PaymentType,
    installments: u8,
) {
    if payment_type == PaymentType::Installment
        && !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&installments)
    {
        errors.add(
            "installments",
            format!("must be between {MIN_INSTALLMENTS} and {MAX_INSTALLMENTS}"),
        );
    }
}

pub fn check_invoice_numbers(errors: &mut FieldErrors, invoice_numbers: &[String]) {
    if invoice_numbers.len() > MAX_INVOICE_NUMBERS {
        errors.add(
            "invoiceNumbers",
            format!("at most {MAX_INVOICE_NUMBERS} invoice numbers"),
        );
    }
}

/// `later` must not fall before `earlier` when both are set
pub fn check_date_order(
    errors: &mut FieldErrors,
    field: &str,
    earlier: Option<NaiveDate>,
    later: Option<NaiveDate>,
) {
    if let (Some(start), Some(end)) = (earlier, later)
        && end < start
    {
        errors.add(field, "must not be before the entry date");
    }
}

/// E-mail shape check: one `@` with a dotted domain
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

// ── Users ───────────────────────────────────────────────────────────

fn check_email(errors: &mut FieldErrors, value: &str) {
    if !is_valid_email(value) {
        errors.add("email", "must be a valid e-mail address");
    }
}

fn check_password(errors: &mut FieldErrors, value: &str) {
    if value.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
}

/// Check a new user before it is sent to the server
pub fn validate_user_create(payload: &UserCreate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_required_text(&mut errors, "name", &payload.name, MAX_SHORT_TEXT_LEN);
    check_email(&mut errors, &payload.email);
    check_password(&mut errors, &payload.password);
    errors
}

/// Check a partial user update; absent fields are left alone
pub fn validate_user_update(payload: &UserUpdate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(name) = &payload.name {
        check_required_text(&mut errors, "name", name, MAX_SHORT_TEXT_LEN);
    }
    if let Some(email) = &payload.email {
        check_email(&mut errors, email);
    }
    if let Some(password) = &payload.password {
        check_password(&mut errors, password);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_field_errors_accumulate() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());
        errors.add("equipment", "is required");
        errors.add("equipment", "second");
        errors.add("customerId", "is required");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("equipment").len(), 2);
        assert_eq!(errors.first("customerId"), Some("is required"));
        assert!(errors.get("model").is_empty());
        assert_eq!(
            errors.to_string(),
            "customerId: is required; equipment: is required, second"
        );
    }

    #[test]
    fn test_required_text() {
        let mut errors = FieldErrors::new();
        check_required_text(&mut errors, "equipment", "   ", 10);
        check_required_text(&mut errors, "model", "abcdefghijk", 10);
        check_required_text(&mut errors, "brand", "ok", 10);
        assert!(errors.has("equipment"));
        assert!(errors.has("model"));
        assert!(!errors.has("brand"));
    }

    #[test]
    fn test_amount_bounds() {
        let mut errors = FieldErrors::new();
        check_amount(&mut errors, "a", dec("0"));
        check_amount(&mut errors, "b", MAX_MONEY);
        check_amount(&mut errors, "c", dec("-0.01"));
        check_amount(&mut errors, "d", MAX_MONEY + dec("0.01"));
        check_amount(&mut errors, "e", Decimal::MAX);
        assert!(!errors.has("a"));
        assert!(!errors.has("b"));
        assert_eq!(errors.first("c"), Some("must not be negative"));
        assert_eq!(errors.first("d"), Some("must be at most 1000000000"));
        assert!(errors.has("e"));
    }

    #[test]
    fn test_percentage_bounds() {
        let mut errors = FieldErrors::new();
        check_percentage(&mut errors, "a", dec("0"));
        check_percentage(&mut errors, "b", dec("100"));
        check_percentage(&mut errors, "c", dec("100.01"));
        check_percentage(&mut errors, "d", dec("-1"));
        assert!(!errors.has("a"));
        assert!(!errors.has("b"));
        assert!(errors.has("c"));
        assert!(errors.has("d"));
    }

    #[test]
    fn test_installments_only_checked_for_installment_payments() {
        let mut errors = FieldErrors::new();
        check_installments(&mut errors, PaymentType::Cash, 0);
        assert!(errors.is_empty());
        check_installments(&mut errors, PaymentType::Installment, 13);
        assert!(errors.has("installments"));
    }

    #[test]
    fn test_date_order() {
        let entry = NaiveDate::from_ymd_opt(2024, 5, 10);
        let before = NaiveDate::from_ymd_opt(2024, 5, 9);
        let mut errors = FieldErrors::new();
        check_date_order(&mut errors, "deliveryDate", entry, entry);
        assert!(errors.is_empty());
        check_date_order(&mut errors, "deliveryDate", entry, before);
        assert!(errors.has("deliveryDate"));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("ana@oficina.com.br"));
        assert!(!is_valid_email("ana.oficina.com"));
        assert!(!is_valid_email("@oficina.com"));
        assert!(!is_valid_email("ana@oficina"));
        assert!(!is_valid_email("ana@@oficina.com"));
    }

    #[test]
    fn test_user_create_rules() {
        let mut payload = UserCreate {
            name: "Ana".into(),
            email: "ana@oficina.com".into(),
            password: "segredo".into(),
            role: shared::models::UserRole::Technician,
        };
        assert!(validate_user_create(&payload).is_empty());

        payload.name = " ".into();
        payload.email = "ana.oficina.com".into();
        payload.password = "123".into();
        let errors = validate_user_create(&payload);
        assert!(errors.has("name"));
        assert!(errors.has("email"));
        assert!(errors.has("password"));
    }

    #[test]
    fn test_user_update_checks_only_present_fields() {
        assert!(validate_user_update(&UserUpdate::default()).is_empty());

        let update = UserUpdate {
            email: Some("nope".into()),
            is_active: Some(false),
            ..Default::default()
        };
        let errors = validate_user_update(&update);
        assert_eq!(errors.len(), 1);
        assert!(errors.has("email"));
    }
}
