//! Vendor Integration Module
//!
//! Clients for the third-party APIs this gateway fronts.
//!
//! ```text
//!              ┌─────────────────────┐
//!              │  RateLimitedClient  │
//!              └──────────┬──────────┘
//!                         │
//!      ┌──────────────────┼───────────────────┐
//!      │                  │                   │
//! ┌────┴────┐        ┌────┴────┐       ┌──────┴─────┐
//! │ Airhub  │        │  QPay   │       │  Registry  │
//! │ (plans) │        │(invoice)│       │ (ISO2 ref) │
//! └─────────┘        └─────────┘       └────────────┘
//! ```

pub mod traits;
pub mod http_client;
pub mod airhub;
pub mod qpay;
pub mod registry;

// Re-export commonly used types
pub use traits::{PlanProvider, ProviderError, ProviderResult};
pub use http_client::RateLimitedClient;
pub use airhub::AirhubClient;
pub use qpay::QpayClient;
pub use registry::CountryRegistry;
