//! Oficina Client - HTTP client for the service-order API
//!
//! Provides the [`OficinaApi`] contract consumed by the desk core, a
//! network implementation over `reqwest`, and a caching decorator.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use api::OficinaApi;
pub use cache::CachedApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::NetworkHttpClient;

// Re-export shared types for convenience
pub use shared::client::{LoginRequest, LoginResponse};
