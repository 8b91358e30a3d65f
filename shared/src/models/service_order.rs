//! Service Order Model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::customer::Customer;
use crate::order::{FinancialStatus, PaymentMethod, PaymentType, TechnicalStatus};
use crate::util::{calendar_date, calendar_date_opt};

/// One billable line of a service order.
///
/// `total` is derived (`quantity * value - discount + addition`); the server
/// echoes it back but the client always recomputes it while editing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub description: String,
    pub quantity: i32,
    /// Unit value in currency unit
    pub value: Decimal,
    /// Flat discount amount
    #[serde(default)]
    pub discount: Decimal,
    /// Flat addition amount
    #[serde(default)]
    pub addition: Decimal,
    #[serde(default)]
    pub total: Decimal,
}

impl ServiceItem {
    /// Build an item with its total computed from the inputs
    pub fn new(
        description: impl Into<String>,
        quantity: i32,
        value: Decimal,
        discount: Decimal,
        addition: Decimal,
    ) -> Self {
        let mut item = Self {
            description: description.into(),
            quantity,
            value,
            discount,
            addition,
            total: Decimal::ZERO,
        };
        item.total = item.compute_total();
        item
    }

    /// `quantity * value - discount + addition`, saturating at the
    /// `Decimal` bounds instead of overflowing
    pub fn compute_total(&self) -> Decimal {
        Decimal::from(self.quantity)
            .saturating_mul(self.value)
            .saturating_sub(self.discount)
            .saturating_add(self.addition)
    }
}

/// Service order as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    pub id: String,
    /// Sequential number assigned by the server
    pub order_number: i64,

    // === Subject ===
    pub customer_id: String,
    /// Denormalized customer snapshot (present on detail responses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    pub equipment: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub voltage: Option<String>,
    #[serde(default)]
    pub accessories: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub reported_defect: Option<String>,

    // === Flags ===
    #[serde(default)]
    pub warranty: bool,
    #[serde(default)]
    pub is_return: bool,

    // === Status ===
    #[serde(default)]
    pub status: TechnicalStatus,
    #[serde(default)]
    pub financial: FinancialStatus,

    // === Dates ===
    #[serde(with = "calendar_date")]
    pub entry_date: NaiveDate,
    #[serde(default, with = "calendar_date_opt")]
    pub approval_date: Option<NaiveDate>,
    #[serde(default, with = "calendar_date_opt")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default, with = "calendar_date_opt")]
    pub delivery_date: Option<NaiveDate>,

    // === Money ===
    #[serde(default)]
    pub services: Vec<ServiceItem>,
    #[serde(default)]
    pub services_sum: Decimal,
    #[serde(default)]
    pub total_discount: Decimal,
    #[serde(default)]
    pub total_addition: Decimal,
    #[serde(default)]
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub addition_percentage: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,

    // === Payment ===
    #[serde(default)]
    pub payment_type: PaymentType,
    #[serde(default = "default_installments")]
    pub installments: u8,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_conditions: Option<String>,
    /// Up to three invoice numbers
    #[serde(default)]
    pub invoice_numbers: Vec<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_installments() -> u8 {
    1
}

impl ServiceOrder {
    /// Customer name from the snapshot, if the response carried one
    pub fn customer_name(&self) -> Option<&str> {
        self.customer.as_ref().map(|c| c.name.as_str())
    }
}

/// Create / full-update payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrderPayload {
    pub customer_id: String,
    pub equipment: String,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub serial_number: Option<String>,
    pub voltage: Option<String>,
    pub accessories: Option<String>,
    pub observations: Option<String>,
    pub reported_defect: Option<String>,
    pub warranty: bool,
    pub is_return: bool,
    pub status: TechnicalStatus,
    pub financial: FinancialStatus,
    #[serde(with = "calendar_date")]
    pub entry_date: NaiveDate,
    #[serde(with = "calendar_date_opt")]
    pub approval_date: Option<NaiveDate>,
    #[serde(with = "calendar_date_opt")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(with = "calendar_date_opt")]
    pub delivery_date: Option<NaiveDate>,
    pub services: Vec<ServiceItem>,
    pub services_sum: Decimal,
    pub total_discount: Decimal,
    pub total_addition: Decimal,
    pub discount_percentage: Decimal,
    pub addition_percentage: Decimal,
    pub total_amount: Decimal,
    pub payment_type: PaymentType,
    pub installments: u8,
    pub payment_method: Option<PaymentMethod>,
    pub payment_conditions: Option<String>,
    pub invoice_numbers: Vec<String>,
}

/// Narrow technical-status update.
///
/// Carries the dates derived by the status machine; `None` is sent as
/// `null` so the server clears the field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: TechnicalStatus,
    #[serde(with = "calendar_date_opt")]
    pub approval_date: Option<NaiveDate>,
    #[serde(with = "calendar_date_opt")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(with = "calendar_date_opt")]
    pub expected_delivery_date: Option<NaiveDate>,
}

/// Narrow financial-status update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStatusUpdate {
    pub financial: FinancialStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_item_total() {
        let item = ServiceItem::new("DIAGNÓSTICO", 2, dec("50"), dec("10"), dec("5"));
        assert_eq!(item.total, dec("95"));
    }

    #[test]
    fn test_item_total_saturates() {
        let item = ServiceItem::new("X", 2, Decimal::MAX, Decimal::ZERO, Decimal::ONE);
        assert_eq!(item.total, Decimal::MAX);
    }

    #[test]
    fn test_order_from_api_json() {
        let json = r#"{
            "id": "os-1",
            "orderNumber": 1024,
            "customerId": "c-1",
            "customer": { "id": "c-1", "name": "Maria Souza" },
            "equipment": "Liquidificador",
            "status": "APPROVED",
            "financial": "OPEN",
            "entryDate": "2024-05-01T00:00:00.000Z",
            "approvalDate": "2024-05-02",
            "deliveryDate": null,
            "services": [
                { "description": "DIAGNÓSTICO", "quantity": 1, "value": "100.00",
                  "discount": "0", "addition": "0", "total": "100.00" }
            ],
            "servicesSum": "100.00",
            "totalDiscount": "0.00",
            "totalAddition": "0.00",
            "discountPercentage": "10",
            "additionPercentage": "0",
            "totalAmount": "90.00",
            "paymentType": "INSTALLMENT",
            "installments": 3,
            "paymentMethod": "PIX"
        }"#;

        let order: ServiceOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_number, 1024);
        assert_eq!(order.customer_name(), Some("Maria Souza"));
        assert_eq!(order.entry_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(order.approval_date, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(order.delivery_date, None);
        assert_eq!(order.services[0].value, dec("100.00"));
        assert_eq!(order.total_amount, dec("90.00"));
        assert_eq!(order.payment_method, Some(PaymentMethod::Pix));
        assert!(order.invoice_numbers.is_empty());
    }

    #[test]
    fn test_status_update_serializes_null_dates() {
        let update = StatusUpdate {
            status: TechnicalStatus::AwaitingConfirmation,
            approval_date: None,
            delivery_date: None,
            expected_delivery_date: None,
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["status"], "AWAITING_CONFIRMATION");
        assert!(value["approvalDate"].is_null());
        assert!(value.get("deliveryDate").is_some());
    }
}
