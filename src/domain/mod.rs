//! Domain types and models

mod codes;
mod country;
mod normalizer;
mod plan;

pub use codes::CountryReference;
pub use country::{normalize_code, Continent, CountrySummary};
pub use normalizer::{CountryNormalizer, MissingPricePolicy, SortPolicy};
pub use plan::{coerce_number, plan_list, plan_records, retain_country, FieldMap};
