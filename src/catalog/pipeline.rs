//! Country catalog service
//!
//! Ties the session, batch planner, normalizer and caches together:
//!
//! 1. Serve the cached payload while it is fresh
//! 2. Otherwise fetch every batch of the code universe
//! 3. Normalize the records against the country reference
//! 4. Store and return the new payload

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::cache::{Clock, TtlCache};
use crate::config::{CatalogSettings, MissingSettings};
use crate::domain::{Continent, CountryNormalizer, CountrySummary};
use crate::providers::{CountryRegistry, ProviderResult};

use super::batch::BatchPlanner;
use super::session::PlanSession;

/// Body of `GET /countries`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountriesPayload {
    pub countries: Vec<CountrySummary>,
    pub total_countries: usize,
    /// Raw plan records that went into the list
    pub total_plans: usize,
    /// Batches whose query failed; their countries are missing
    pub partial_batches: usize,
}

/// Catalog payload plus whether it came from the cache
#[derive(Debug, Clone)]
pub struct CatalogView {
    pub payload: CountriesPayload,
    pub cached: bool,
}

/// Uppercased, deduplicated configured codes, or every known code
pub fn code_universe(configured: &[String]) -> Vec<String> {
    let mut codes: Vec<String> = Vec::with_capacity(configured.len());
    for code in configured {
        let code = code.trim().to_ascii_uppercase();
        if !code.is_empty() && !codes.contains(&code) {
            codes.push(code);
        }
    }

    if codes.is_empty() {
        Continent::all_codes()
    } else {
        codes
    }
}

pub struct CountryCatalog {
    session: Arc<PlanSession>,
    planner: BatchPlanner,
    normalizer: CountryNormalizer,
    registry: CountryRegistry,
    universe: Vec<String>,
    cache: TtlCache<CountriesPayload>,
}

impl CountryCatalog {
    pub fn new(
        session: Arc<PlanSession>,
        registry: CountryRegistry,
        settings: &CatalogSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let airhub = session.settings();
        let normalizer = CountryNormalizer::new(
            airhub.fields.clone(),
            settings.sort_policy,
            settings.missing_price_policy,
        );

        CountryCatalog {
            planner: BatchPlanner::from_settings(airhub),
            universe: code_universe(&airhub.country_codes),
            normalizer,
            registry,
            cache: TtlCache::with_ttl_secs(settings.ttl_secs, clock),
            session,
        }
    }

    pub fn session(&self) -> &Arc<PlanSession> {
        &self.session
    }

    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_fresh()
    }

    /// Missing credentials, checked before the cache so a misconfigured
    /// deployment never serves stale data as if healthy
    pub fn require_config(&self) -> Result<(), MissingSettings> {
        self.session.require_config()
    }

    /// Current country list, from cache when fresh
    #[instrument(
        skip(self),
        fields(
            universe = self.universe.len(),
            batch_size = self.planner.batch_size(),
            concurrency = self.planner.max_concurrency()
        )
    )]
    pub async fn countries(&self) -> ProviderResult<CatalogView> {
        if let Some(entry) = self.cache.get() {
            debug!(fetched_at = %entry.fetched_at, "Serving countries from cache");
            return Ok(CatalogView {
                payload: entry.payload,
                cached: true,
            });
        }

        let outcome = self.planner.fetch_all(&self.session, &self.universe).await?;
        let reference = self.registry.reference().await;
        let countries = self.normalizer.normalize(&outcome.records, &reference);

        let payload = CountriesPayload {
            total_countries: countries.len(),
            total_plans: outcome.records.len(),
            partial_batches: outcome.partial_batches(),
            countries,
        };

        info!(
            countries = payload.total_countries,
            plans = payload.total_plans,
            partial_batches = payload.partial_batches,
            "Country catalog refreshed"
        );

        Ok(CatalogView {
            payload: self.cache.put(payload).payload,
            cached: false,
        })
    }
}
