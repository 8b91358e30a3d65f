//! Service-order enumerations
//!
//! Fixed technical and financial status sets plus payment kinds.
//! Wire names are SCREAMING_SNAKE_CASE.

pub mod status;

// Re-exports
pub use status::*;
