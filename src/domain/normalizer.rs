//! Country normalizer
//!
//! Folds raw plan records into one [`CountrySummary`] per country. Records are
//! grouped by normalized country name, each group resolves its ISO2 code once
//! (first writer wins), and groups that end up on the same code are merged.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::codes::{fallback_code, normalize_name, override_code, CountryReference};
use super::country::{flag_for, normalize_code, Continent, CountrySummary};
use super::plan::FieldMap;

/// Output ordering of the country list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Countries with a resolved code first, then by name
    #[default]
    CodedFirst,
    /// Purely by name
    Alphabetical,
}

/// What `fromPrice` holds when a country has no positive price
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MissingPricePolicy {
    #[default]
    Zero,
    Null,
}

/// Running state for one country while folding
#[derive(Debug)]
struct Accumulator {
    name: String,
    code: Option<String>,
    min_price: Option<f64>,
}

impl Accumulator {
    fn observe_price(&mut self, price: Option<f64>) {
        if let Some(p) = price.filter(|p| *p > 0.0) {
            self.min_price = Some(self.min_price.map_or(p, |m| m.min(p)));
        }
    }

    fn absorb(&mut self, other: Accumulator) {
        if other.name < self.name {
            self.name = other.name;
        }
        self.observe_price(other.min_price);
    }
}

/// Folds raw plan records into a sorted, deduplicated country list
#[derive(Debug, Clone, Default)]
pub struct CountryNormalizer {
    fields: FieldMap,
    sort_policy: SortPolicy,
    missing_price_policy: MissingPricePolicy,
}

impl CountryNormalizer {
    pub fn new(
        fields: FieldMap,
        sort_policy: SortPolicy,
        missing_price_policy: MissingPricePolicy,
    ) -> Self {
        CountryNormalizer {
            fields,
            sort_policy,
            missing_price_policy,
        }
    }

    /// Normalize a batch of raw plan records
    pub fn normalize(&self, records: &[Value], reference: &CountryReference) -> Vec<CountrySummary> {
        let mut by_name: HashMap<String, Accumulator> = HashMap::new();

        for raw in records {
            let record = self.fields.read(raw);
            let record_code = record.country_code.as_deref().and_then(normalize_code);

            // A code without a name stands in as the name
            let Some(name) = record.country_name.or_else(|| record.country_code.clone()) else {
                continue;
            };
            let key = normalize_name(&name);
            if key.is_empty() {
                continue;
            }

            let entry = by_name.entry(key.clone()).or_insert_with(|| Accumulator {
                name: name.clone(),
                code: None,
                min_price: None,
            });

            if name < entry.name {
                entry.name = name;
            }
            if entry.code.is_none() {
                entry.code = override_code(&key).map(str::to_string).or(record_code);
            }
            entry.observe_price(record.price);
        }

        // Codes the records never supplied come from the registry, then the fallback table
        for (key, entry) in by_name.iter_mut() {
            if entry.code.is_none() {
                entry.code = reference
                    .lookup(key)
                    .or_else(|| fallback_code(key))
                    .map(str::to_string);
            }
        }

        let mut by_code: HashMap<String, Accumulator> = HashMap::new();
        let mut uncoded: Vec<Accumulator> = Vec::new();

        for (_, entry) in by_name {
            match entry.code.clone() {
                Some(code) => match by_code.entry(code) {
                    Entry::Occupied(mut existing) => existing.get_mut().absorb(entry),
                    Entry::Vacant(slot) => {
                        slot.insert(entry);
                    }
                },
                None => uncoded.push(entry),
            }
        }

        let mut countries: Vec<CountrySummary> = by_code
            .into_values()
            .chain(uncoded)
            .map(|entry| self.summarize(entry))
            .collect();

        self.sort(&mut countries);
        countries
    }

    fn summarize(&self, entry: Accumulator) -> CountrySummary {
        let from_price = match (entry.min_price, self.missing_price_policy) {
            (Some(p), _) => Some(p),
            (None, MissingPricePolicy::Zero) => Some(0.0),
            (None, MissingPricePolicy::Null) => None,
        };

        CountrySummary {
            continent: Continent::from_code(entry.code.as_deref()),
            flag: entry.code.as_deref().map(flag_for).unwrap_or_default(),
            code: entry.code,
            name: entry.name,
            from_price,
        }
    }

    fn sort(&self, countries: &mut [CountrySummary]) {
        let coded_first = self.sort_policy == SortPolicy::CodedFirst;
        countries.sort_by(|a, b| {
            let rank = |c: &CountrySummary| coded_first && c.code.is_none();
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.code.cmp(&b.code))
        });
    }
}
