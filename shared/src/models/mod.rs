//! Data models
//!
//! Wire shapes of the service-order API. Field names are camelCase on the
//! wire; money is `Decimal` (accepts decimal strings or numbers).

pub mod customer;
pub mod service_order;
pub mod user;

// Re-exports
pub use customer::*;
pub use service_order::*;
pub use user::*;
