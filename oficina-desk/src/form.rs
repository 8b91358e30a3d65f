//! Order form orchestration
//!
//! Holds the field state of one order being created or edited, routes item
//! edits through the [`ServiceItemLedger`] and prices them live, gates the
//! status select through the [`StatusMachine`] and validates before any
//! request is issued.
//!
//! ```text
//! create(?customerId) / edit(id) ──> draft + ledger ──> validate ──> submit
//!                                                     │            │
//!                                                FieldErrors   Saved + Redirect
//!                                                                or Failed
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use oficina_client::{ClientError, OficinaApi};
use rust_decimal::Decimal;
use shared::models::{ServiceItem, ServiceOrder, ServiceOrderPayload};
use shared::order::{FinancialStatus, PaymentMethod, PaymentType, TechnicalStatus};
use thiserror::Error;

use crate::ledger::ServiceItemLedger;
use crate::notify::{Notification, Redirect};
use crate::pricing::{self, PricingBreakdown, PricingInputs};
use crate::status::{StatusDates, StatusMachine, TransitionError};
use crate::validation::{
    FieldErrors, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, check_date_order, check_installments,
    check_invoice_numbers, check_optional_text, check_percentage, check_required_text,
};

#[derive(Debug, Error)]
pub enum FormError {
    /// Edit route reached without an order id
    #[error("order id is missing")]
    MissingId,

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// Editable order fields (everything except the items and derived sums)
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub customer_id: Option<String>,
    pub equipment: String,
    pub model: String,
    pub brand: String,
    pub serial_number: String,
    pub voltage: String,
    pub accessories: String,
    pub observations: String,
    pub reported_defect: String,
    pub warranty: bool,
    pub is_return: bool,
    pub status: TechnicalStatus,
    pub financial: FinancialStatus,
    pub entry_date: Option<NaiveDate>,
    pub approval_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub discount_percentage: Decimal,
    pub addition_percentage: Decimal,
    pub payment_type: PaymentType,
    pub installments: u8,
    pub payment_method: Option<PaymentMethod>,
    pub payment_conditions: String,
    pub invoice_numbers: Vec<String>,
}

impl OrderDraft {
    /// Fresh order received today
    pub fn new(today: NaiveDate) -> Self {
        Self {
            customer_id: None,
            equipment: String::new(),
            model: String::new(),
            brand: String::new(),
            serial_number: String::new(),
            voltage: String::new(),
            accessories: String::new(),
            observations: String::new(),
            reported_defect: String::new(),
            warranty: false,
            is_return: false,
            status: TechnicalStatus::AwaitingConfirmation,
            financial: FinancialStatus::Open,
            entry_date: Some(today),
            approval_date: None,
            expected_delivery_date: None,
            delivery_date: None,
            discount_percentage: Decimal::ZERO,
            addition_percentage: Decimal::ZERO,
            payment_type: PaymentType::Cash,
            installments: 1,
            payment_method: None,
            payment_conditions: String::new(),
            invoice_numbers: Vec::new(),
        }
    }

    pub fn from_order(order: &ServiceOrder) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            customer_id: Some(order.customer_id.clone()).filter(|id| !id.is_empty()),
            equipment: order.equipment.clone(),
            model: text(&order.model),
            brand: text(&order.brand),
            serial_number: text(&order.serial_number),
            voltage: text(&order.voltage),
            accessories: text(&order.accessories),
            observations: text(&order.observations),
            reported_defect: text(&order.reported_defect),
            warranty: order.warranty,
            is_return: order.is_return,
            status: order.status,
            financial: order.financial,
            entry_date: Some(order.entry_date),
            approval_date: order.approval_date,
            expected_delivery_date: order.expected_delivery_date,
            delivery_date: order.delivery_date,
            discount_percentage: order.discount_percentage,
            addition_percentage: order.addition_percentage,
            payment_type: order.payment_type,
            installments: order.installments,
            payment_method: order.payment_method,
            payment_conditions: text(&order.payment_conditions),
            invoice_numbers: order.invoice_numbers.clone(),
        }
    }

    fn dates(&self) -> StatusDates {
        StatusDates {
            approval_date: self.approval_date,
            delivery_date: self.delivery_date,
            expected_delivery_date: self.expected_delivery_date,
        }
    }

    fn set_dates(&mut self, dates: StatusDates) {
        self.approval_date = dates.approval_date;
        self.delivery_date = dates.delivery_date;
        self.expected_delivery_date = dates.expected_delivery_date;
    }
}

/// Check an order draft and its items before submission.
///
/// `allow_empty_items` is set when editing an order that was persisted
/// without items; its stored sums are resubmitted unchanged.
pub fn validate_order(
    draft: &OrderDraft,
    items: &[ServiceItem],
    allow_empty_items: bool,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.customer_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
        errors.add("customerId", "select a customer");
    }
    check_required_text(&mut errors, "equipment", &draft.equipment, MAX_SHORT_TEXT_LEN);
    check_optional_text(&mut errors, "model", Some(draft.model.as_str()), MAX_SHORT_TEXT_LEN);
    check_optional_text(&mut errors, "brand", Some(draft.brand.as_str()), MAX_SHORT_TEXT_LEN);
    check_optional_text(&mut errors, "serialNumber", Some(draft.serial_number.as_str()), MAX_SHORT_TEXT_LEN);
    check_optional_text(&mut errors, "observations", Some(draft.observations.as_str()), MAX_NOTE_LEN);
    check_optional_text(&mut errors, "reportedDefect", Some(draft.reported_defect.as_str()), MAX_NOTE_LEN);
    check_optional_text(&mut errors, "paymentConditions", Some(draft.payment_conditions.as_str()), MAX_NOTE_LEN);

    if items.is_empty() && !allow_empty_items {
        errors.add("services", "add at least one service");
    }

    check_percentage(&mut errors, "discountPercentage", draft.discount_percentage);
    check_percentage(&mut errors, "additionPercentage", draft.addition_percentage);
    check_installments(&mut errors, draft.payment_type, draft.installments);
    check_invoice_numbers(&mut errors, &draft.invoice_numbers);

    if draft.entry_date.is_none() {
        errors.add("entryDate", "is required");
    }
    check_date_order(&mut errors, "deliveryDate", draft.entry_date, draft.delivery_date);

    errors
}

/// Extract `customerId` from a query string such as `?customerId=c-1&x=y`
pub fn customer_id_from_query(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "customerId")
        .and_then(|(_, value)| {
            // Undecodable values are treated as absent
            let value = value.replace('+', " ");
            urlencoding::decode(&value).ok().map(|v| v.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}

/// Result of [`OrderForm::submit`]
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Client-side validation failed; no request was issued
    Invalid(FieldErrors),
    Saved {
        order: ServiceOrder,
        notification: Notification,
        redirect: Redirect,
    },
    /// The request failed; the draft is kept as it was
    Failed(Notification),
}

/// Clears the in-flight flag when the submission ends or is dropped
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct OrderForm<A: OficinaApi + ?Sized> {
    api: Arc<A>,
    mode: FormMode,
    pub draft: OrderDraft,
    pub ledger: ServiceItemLedger,
    /// Order as last loaded from the server (edit mode)
    persisted: Option<ServiceOrder>,
    machine: StatusMachine,
    errors: FieldErrors,
    submitting: Arc<AtomicBool>,
    predicted_number: Option<i64>,
}

impl<A: OficinaApi + ?Sized> OrderForm<A> {
    /// Blank form; `query` may pre-select a customer (`?customerId=...`)
    pub fn create(api: Arc<A>, query: Option<&str>) -> Self {
        let mut draft = OrderDraft::new(shared::util::today());
        draft.customer_id = query.and_then(customer_id_from_query);

        Self {
            api,
            mode: FormMode::Create,
            draft,
            ledger: ServiceItemLedger::new(),
            persisted: None,
            machine: StatusMachine::permissive(),
            errors: FieldErrors::new(),
            submitting: Arc::new(AtomicBool::new(false)),
            predicted_number: None,
        }
    }

    /// Load an existing order for editing
    pub async fn edit(api: Arc<A>, id: Option<&str>) -> Result<Self, FormError> {
        let id = id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(FormError::MissingId)?;

        let order = api.get_order(id).await.map_err(|e| {
            tracing::error!(order_id = %id, error = %e, "Failed to load order");
            e
        })?;

        let mut form = Self::create(api, None);
        form.mode = FormMode::Edit { id: id.to_string() };
        form.hydrate(order);
        Ok(form)
    }

    /// Replace every field with the values of `order`
    pub fn hydrate(&mut self, order: ServiceOrder) {
        self.draft = OrderDraft::from_order(&order);
        self.ledger = ServiceItemLedger::from_items(order.services.clone());
        self.predicted_number = Some(order.order_number);
        self.persisted = Some(order);
        self.errors = FieldErrors::new();
    }

    /// Ask the server for the number the new order will likely get
    pub async fn load_next_number(&mut self) -> Option<i64> {
        if self.mode != FormMode::Create {
            return self.predicted_number;
        }
        match self.api.get_next_sequence_number().await {
            Ok(seq) => self.predicted_number = Some(seq.predicted_next()),
            Err(e) => tracing::warn!(error = %e, "Could not fetch next order number"),
        }
        self.predicted_number
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn persisted(&self) -> Option<&ServiceOrder> {
        self.persisted.as_ref()
    }

    pub fn predicted_number(&self) -> Option<i64> {
        self.predicted_number
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Shared view of the in-flight flag, readable while `submit` runs
    pub fn submitting_flag(&self) -> Arc<AtomicBool> {
        self.submitting.clone()
    }

    // ========== Status selects ==========

    /// Status select: applies date side effects to the draft
    pub fn set_status(&mut self, to: TechnicalStatus) -> Result<(), TransitionError> {
        let mut dates = self.draft.dates();
        self.machine
            .apply_technical(self.draft.status, to, &mut dates, shared::util::today())?;
        self.draft.status = to;
        self.draft.set_dates(dates);
        Ok(())
    }

    pub fn set_financial(&mut self, to: FinancialStatus) -> Result<(), TransitionError> {
        self.machine.check_financial(self.draft.financial, to)?;
        self.draft.financial = to;
        Ok(())
    }

    // ========== Pricing ==========

    fn pricing_inputs(&self) -> PricingInputs {
        let persisted = match self.mode {
            FormMode::Edit { .. } => self.persisted.as_ref(),
            FormMode::Create => None,
        };
        PricingInputs::resolve(
            &self.ledger,
            persisted,
            self.draft.discount_percentage,
            self.draft.addition_percentage,
        )
    }

    pub fn breakdown(&self) -> PricingBreakdown {
        pricing::calculate(&self.pricing_inputs())
    }

    pub fn total_amount(&self) -> Decimal {
        self.breakdown().total_amount
    }

    // ========== Validation / submission ==========

    fn allow_empty_items(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
            && self.persisted.as_ref().is_some_and(|o| o.services.is_empty())
    }

    /// Run the validation gate, keeping the errors for display
    pub fn validate(&mut self) -> bool {
        self.errors = validate_order(&self.draft, self.ledger.items(), self.allow_empty_items());
        self.errors.is_empty()
    }

    /// Request body for the current state
    pub fn build_payload(&self) -> ServiceOrderPayload {
        let text = |v: &str| Some(v.trim().to_string()).filter(|s| !s.is_empty());
        let draft = &self.draft;
        let breakdown = self.breakdown();

        ServiceOrderPayload {
            customer_id: draft.customer_id.clone().unwrap_or_default(),
            equipment: draft.equipment.trim().to_string(),
            model: text(&draft.model),
            brand: text(&draft.brand),
            serial_number: text(&draft.serial_number),
            voltage: text(&draft.voltage),
            accessories: text(&draft.accessories),
            observations: text(&draft.observations),
            reported_defect: text(&draft.reported_defect),
            warranty: draft.warranty,
            is_return: draft.is_return,
            status: draft.status,
            financial: draft.financial,
            entry_date: draft.entry_date.unwrap_or_else(shared::util::today),
            approval_date: draft.approval_date,
            expected_delivery_date: draft.expected_delivery_date,
            delivery_date: draft.delivery_date,
            services: self.ledger.items().to_vec(),
            services_sum: breakdown.services_sum,
            total_discount: breakdown.total_discount,
            total_addition: breakdown.total_addition,
            discount_percentage: draft.discount_percentage,
            addition_percentage: draft.addition_percentage,
            total_amount: breakdown.total_amount,
            payment_type: draft.payment_type,
            installments: match draft.payment_type {
                PaymentType::Installment => draft.installments,
                _ => 1,
            },
            payment_method: draft.payment_method,
            payment_conditions: text(&draft.payment_conditions),
            invoice_numbers: draft
                .invoice_numbers
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Validate, then create or update the order
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.validate() {
            tracing::debug!(fields = self.errors.len(), "Order form rejected by validation");
            return SubmitOutcome::Invalid(self.errors.clone());
        }

        let payload = self.build_payload();
        let _in_flight = InFlight::start(&self.submitting);

        let result = match &self.mode {
            FormMode::Create => self.api.create_order(&payload).await,
            FormMode::Edit { id } => self.api.update_order(id, &payload).await,
        };

        match result {
            Ok(order) => {
                let message = match self.mode {
                    FormMode::Create => "Service order created",
                    FormMode::Edit { .. } => "Service order updated",
                };
                tracing::info!(order_id = %order.id, order_number = order.order_number, "{message}");
                SubmitOutcome::Saved {
                    redirect: Redirect::to_order(order.id.clone()),
                    notification: Notification::success(message),
                    order,
                }
            }
            Err(e) => {
                tracing::error!(mode = ?self.mode, error = %e, "Failed to save service order");
                if let ClientError::Validation { errors, .. } = &e {
                    self.errors.extend_from(errors);
                }
                SubmitOutcome::Failed(Notification::error(e.user_message()))
            }
        }
    }
}
