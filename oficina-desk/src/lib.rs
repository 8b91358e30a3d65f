//! Oficina desk core
//!
//! Client-side business logic of the repair-shop application: money and
//! date formatting, validation, the service-item ledger, order pricing, the
//! status state machine, order form and list orchestration, and the
//! signed-in session.

pub mod board;
pub mod config;
pub mod form;
pub mod format;
pub mod ledger;
pub mod logger;
pub mod notify;
pub mod pricing;
pub mod session;
pub mod status;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod testing;

pub use board::{OrderBoard, OrderRow};
pub use config::DeskConfig;
pub use form::{FormError, FormMode, OrderDraft, OrderForm, SubmitOutcome};
pub use ledger::{ItemDraft, LedgerError, LedgerTotals, ServiceItemLedger};
pub use notify::{Notification, Redirect, Route};
pub use pricing::{PricingBreakdown, PricingInputs};
pub use session::{SessionContext, SessionState};
pub use status::{StatusMachine, StatusUpdater, TransitionError, TransitionTable};
pub use storage::LocalStore;
pub use validation::FieldErrors;
