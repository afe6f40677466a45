//! Country catalog assembly
//!
//! ```text
//! CountryCatalog ──▶ BatchPlanner ──▶ PlanSession ──▶ PlanProvider
//!       │                                  (token cache, 401 retry)
//!       ├──▶ CountryRegistry (reference names)
//!       └──▶ CountryNormalizer ──▶ TtlCache<CountriesPayload>
//! ```

mod batch;
mod pipeline;
mod session;

pub use pipeline::{CountriesPayload, CountryCatalog};
pub use session::PlanSession;

#[cfg(test)]
pub(crate) use session::test_support;
