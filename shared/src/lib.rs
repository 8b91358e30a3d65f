//! Shared types for the Oficina workspace
//!
//! Wire types exchanged with the service-order API: orders, items,
//! customers, users, list filters and paginated responses.
//! Used by both `oficina-client` and `oficina-desk`.

pub mod client;
pub mod models;
pub mod order;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{Customer, ServiceItem, ServiceOrder, ServiceOrderPayload, User};
pub use order::{FinancialStatus, PaymentMethod, PaymentType, TechnicalStatus};
pub use request::OrderFilters;
pub use response::{Paginated, SequenceNumber};
