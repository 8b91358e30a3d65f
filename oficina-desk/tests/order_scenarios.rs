// oficina-desk/tests/order_scenarios.rs
// End-to-end walk through a new order using only the public API

use std::sync::Arc;

use oficina_client::{ClientConfig, NetworkHttpClient};
use oficina_desk::pricing::total_amount;
use oficina_desk::status::StatusDates;
use oficina_desk::{
    ItemDraft, LedgerTotals, OrderForm, PricingInputs, ServiceItemLedger, StatusMachine,
    SubmitOutcome, TransitionTable,
};
use rust_decimal::Decimal;
use shared::order::TechnicalStatus;
use shared::util::today;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Client pointed at a port nothing listens on
fn offline_client() -> Arc<NetworkHttpClient> {
    Arc::new(
        ClientConfig::new("http://127.0.0.1:9")
            .with_timeout(1)
            .build_http_client()
            .unwrap(),
    )
}

#[test]
fn test_item_lifecycle_and_pricing() {
    let mut ledger = ServiceItemLedger::new();

    // Add the first item
    ledger.draft = ItemDraft {
        description: "DIAGNÓSTICO".into(),
        quantity: 1,
        value: dec("100"),
        ..Default::default()
    };
    ledger.add_or_update().unwrap();
    assert_eq!(ledger.items()[0].total, dec("100"));
    assert_eq!(
        ledger.totals(),
        LedgerTotals {
            services_sum: dec("100"),
            total_discount: Decimal::ZERO,
            total_addition: Decimal::ZERO,
        }
    );

    // 10% discount on the order
    let inputs = PricingInputs::from_totals(ledger.totals(), dec("10"), Decimal::ZERO);
    assert_eq!(total_amount(&inputs), dec("90"));

    // Double the quantity
    ledger.begin_edit(0).unwrap();
    ledger.draft.quantity = 2;
    ledger.add_or_update().unwrap();
    assert_eq!(ledger.items()[0].total, dec("200"));
    assert_eq!(ledger.totals().services_sum, dec("200"));

    // Remove the only item
    ledger.remove(0).unwrap();
    assert_eq!(ledger.totals(), LedgerTotals::default());
    let inputs = PricingInputs::from_totals(ledger.totals(), dec("10"), Decimal::ZERO);
    assert_eq!(total_amount(&inputs), Decimal::ZERO);
}

#[test]
fn test_delivered_jump_inline_vs_strict() {
    let from = TechnicalStatus::AwaitingConfirmation;
    let to = TechnicalStatus::Delivered;

    // Inline dropdown
    let mut dates = StatusDates::default();
    StatusMachine::permissive()
        .apply_technical(from, to, &mut dates, today())
        .unwrap();
    assert_eq!(dates.delivery_date, Some(today()));

    // Strict modal with a table that forbids the jump
    let strict = StatusMachine::new(
        TransitionTable::new()
            .allow(from, TechnicalStatus::Approved)
            .allow(TechnicalStatus::Approved, TechnicalStatus::Ready)
            .allow(TechnicalStatus::Ready, to),
        TransitionTable::permissive(),
    );
    let mut dates = StatusDates::default();
    let err = strict
        .apply_technical(from, to, &mut dates, today())
        .unwrap_err();
    assert!(err.to_string().starts_with("cannot move from"));
    assert_eq!(dates.delivery_date, None);
}

#[tokio::test]
async fn test_empty_equipment_aborts_before_network() {
    let mut form = OrderForm::create(offline_client(), Some("?customerId=c-1"));
    form.ledger.draft = ItemDraft {
        description: "DIAGNÓSTICO".into(),
        value: dec("100"),
        ..Default::default()
    };
    form.ledger.add_or_update().unwrap();

    match form.submit().await {
        SubmitOutcome::Invalid(errors) => {
            assert!(errors.has("equipment"));
            assert!(!errors.has("customerId"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn test_unreachable_server_keeps_draft() {
    let mut form = OrderForm::create(offline_client(), Some("?customerId=c-1"));
    form.draft.equipment = "Ventilador".into();
    form.ledger.draft = ItemDraft {
        description: "LIMPEZA".into(),
        value: dec("40"),
        ..Default::default()
    };
    form.ledger.add_or_update().unwrap();

    match form.submit().await {
        SubmitOutcome::Failed(note) => assert!(note.is_error()),
        other => panic!("expected transport failure, got {other:?}"),
    }
    assert_eq!(form.draft.equipment, "Ventilador");
    assert_eq!(form.ledger.len(), 1);
}
