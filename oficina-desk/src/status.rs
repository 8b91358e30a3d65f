//! Status state machine
//!
//! Every status change (list dropdown, confirmation modal, form select) goes
//! through [`StatusMachine`]. Call sites differ only in the table they pick:
//! the inline paths use [`TransitionTable::permissive`], the confirmation
//! modal uses [`TransitionTable::standard`] or a custom table.
//!
//! Technical transitions carry date side effects:
//! - into `APPROVED` from another status: approval date = today
//! - into `DELIVERED` from another status: delivery date = today
//! - into `AWAITING_CONFIRMATION`: approval, delivery and expected delivery
//!   dates are cleared

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use chrono::NaiveDate;
use oficina_client::OficinaApi;
use shared::models::{FinancialStatusUpdate, ServiceOrder, StatusUpdate};
use shared::order::{FinancialStatus, TechnicalStatus};
use thiserror::Error;

use crate::notify::Notification;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: String,
    pub to: String,
}

impl TransitionError {
    fn new(from: impl Display, to: impl Display) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

// ============================================================================
// Transition tables
// ============================================================================

/// Set of legal `(from, to)` pairs.
///
/// Staying on the same status is always legal.
#[derive(Debug, Clone)]
pub struct TransitionTable<S> {
    /// `None` accepts every pair
    allowed: Option<HashSet<(S, S)>>,
}

impl<S: Copy + Eq + Hash> TransitionTable<S> {
    /// Strict table with no transitions; extend with [`allow`](Self::allow)
    pub fn new() -> Self {
        Self {
            allowed: Some(HashSet::new()),
        }
    }

    /// Any status to any status
    pub fn permissive() -> Self {
        Self { allowed: None }
    }

    pub fn allow(mut self, from: S, to: S) -> Self {
        if let Some(pairs) = self.allowed.as_mut() {
            pairs.insert((from, to));
        }
        self
    }

    /// Allow `from` to every status in `targets`
    pub fn allow_all(self, from: S, targets: &[S]) -> Self {
        targets.iter().fold(self, |table, to| table.allow(from, *to))
    }

    pub fn allows(&self, from: S, to: S) -> bool {
        from == to
            || self
                .allowed
                .as_ref()
                .is_none_or(|pairs| pairs.contains(&(from, to)))
    }

    pub fn is_permissive(&self) -> bool {
        self.allowed.is_none()
    }
}

impl<S: Copy + Eq + Hash> Default for TransitionTable<S> {
    fn default() -> Self {
        Self::permissive()
    }
}

impl TransitionTable<TechnicalStatus> {
    /// Default workshop flow
    pub fn standard() -> Self {
        use TechnicalStatus::*;
        Self::new()
            .allow_all(AwaitingConfirmation, &[Approved, Rejected])
            .allow_all(Approved, &[Ready, Rejected])
            .allow(Ready, Delivered)
            .allow(Rejected, AwaitingConfirmation)
    }
}

impl TransitionTable<FinancialStatus> {
    /// Default payment flow; `PAID` is final
    pub fn standard() -> Self {
        use FinancialStatus::*;
        Self::new()
            .allow_all(Open, &FinancialStatus::ALL)
            .allow_all(PartiallyPaid, &[Paid, Owing, Overdue, Cancelled])
            .allow_all(Owing, &[Paid, PartiallyPaid, Overdue, Cancelled])
            .allow_all(Overdue, &[Paid, PartiallyPaid, Cancelled])
            .allow_all(Invoiced, &[Paid, Overdue, Cancelled])
            .allow(Cancelled, Open)
    }
}

// ============================================================================
// State machine
// ============================================================================

/// Status-bound dates of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusDates {
    pub approval_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
}

impl From<&ServiceOrder> for StatusDates {
    fn from(order: &ServiceOrder) -> Self {
        Self {
            approval_date: order.approval_date,
            delivery_date: order.delivery_date,
            expected_delivery_date: order.expected_delivery_date,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusMachine {
    technical: TransitionTable<TechnicalStatus>,
    financial: TransitionTable<FinancialStatus>,
}

impl StatusMachine {
    pub fn new(
        technical: TransitionTable<TechnicalStatus>,
        financial: TransitionTable<FinancialStatus>,
    ) -> Self {
        Self {
            technical,
            financial,
        }
    }

    /// Inline paths: every transition accepted
    pub fn permissive() -> Self {
        Self::new(TransitionTable::permissive(), TransitionTable::permissive())
    }

    /// Confirmation-modal path
    pub fn standard() -> Self {
        Self::new(
            TransitionTable::<TechnicalStatus>::standard(),
            TransitionTable::<FinancialStatus>::standard(),
        )
    }

    pub fn check_technical(
        &self,
        from: TechnicalStatus,
        to: TechnicalStatus,
    ) -> Result<(), TransitionError> {
        if self.technical.allows(from, to) {
            Ok(())
        } else {
            Err(TransitionError::new(from, to))
        }
    }

    pub fn check_financial(
        &self,
        from: FinancialStatus,
        to: FinancialStatus,
    ) -> Result<(), TransitionError> {
        if self.financial.allows(from, to) {
            Ok(())
        } else {
            Err(TransitionError::new(from, to))
        }
    }

    /// Validate a technical transition and apply its date side effects.
    ///
    /// `dates` is untouched when the transition is rejected.
    pub fn apply_technical(
        &self,
        from: TechnicalStatus,
        to: TechnicalStatus,
        dates: &mut StatusDates,
        today: NaiveDate,
    ) -> Result<(), TransitionError> {
        self.check_technical(from, to)?;

        match to {
            TechnicalStatus::Approved if from != to => dates.approval_date = Some(today),
            TechnicalStatus::Delivered if from != to => dates.delivery_date = Some(today),
            TechnicalStatus::AwaitingConfirmation => *dates = StatusDates::default(),
            _ => {}
        }
        Ok(())
    }

    /// Build the narrow update request for moving `order` to `to`
    pub fn technical_update(
        &self,
        order: &ServiceOrder,
        to: TechnicalStatus,
        today: NaiveDate,
    ) -> Result<StatusUpdate, TransitionError> {
        let mut dates = StatusDates::from(order);
        self.apply_technical(order.status, to, &mut dates, today)?;
        Ok(StatusUpdate {
            status: to,
            approval_date: dates.approval_date,
            delivery_date: dates.delivery_date,
            expected_delivery_date: dates.expected_delivery_date,
        })
    }
}

// ============================================================================
// Remote updates
// ============================================================================

/// Applies status changes to persisted orders.
///
/// The machine is consulted before any request; an API failure leaves the
/// order as it was and is reported as an error notification.
pub struct StatusUpdater<'a, A: OficinaApi + ?Sized> {
    api: &'a A,
    machine: StatusMachine,
}

impl<'a, A: OficinaApi + ?Sized> StatusUpdater<'a, A> {
    pub fn new(api: &'a A, machine: StatusMachine) -> Self {
        Self { api, machine }
    }

    /// Inline dropdown on the list / detail views
    pub fn inline(api: &'a A) -> Self {
        Self::new(api, StatusMachine::permissive())
    }

    pub fn machine(&self) -> &StatusMachine {
        &self.machine
    }

    /// Move `order` to a new technical status.
    ///
    /// On success `order` is replaced by the server's copy.
    pub async fn update_technical(
        &self,
        order: &mut ServiceOrder,
        to: TechnicalStatus,
    ) -> Notification {
        let update = match self
            .machine
            .technical_update(order, to, shared::util::today())
        {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Status transition rejected");
                return Notification::error(e.to_string());
            }
        };

        match self.api.update_order_status(&order.id, &update).await {
            Ok(updated) => {
                tracing::info!(order_id = %order.id, status = to.code(), "Status updated");
                *order = updated;
                Notification::success(format!("Status changed to {}", to.label()))
            }
            Err(e) => {
                tracing::error!(order_id = %order.id, status = to.code(), error = %e, "Failed to update status");
                Notification::error(e.user_message())
            }
        }
    }

    /// Move `order` to a new financial status
    pub async fn update_financial(
        &self,
        order: &mut ServiceOrder,
        to: FinancialStatus,
    ) -> Notification {
        if let Err(e) = self.machine.check_financial(order.financial, to) {
            tracing::warn!(order_id = %order.id, error = %e, "Financial transition rejected");
            return Notification::error(e.to_string());
        }

        let update = FinancialStatusUpdate { financial: to };
        match self
            .api
            .update_order_financial_status(&order.id, &update)
            .await
        {
            Ok(updated) => {
                tracing::info!(order_id = %order.id, financial = to.code(), "Financial status updated");
                *order = updated;
                Notification::success(format!("Financial status changed to {}", to.label()))
            }
            Err(e) => {
                tracing::error!(order_id = %order.id, financial = to.code(), error = %e, "Failed to update financial status");
                Notification::error(e.user_message())
            }
        }
    }
}
