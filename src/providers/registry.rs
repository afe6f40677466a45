//! Public country registry
//!
//! Fetches a name to ISO2 table from a restcountries-style endpoint
//! (`[{"name": {"common": .., "official": ..}, "cca2": ..}]`) and keeps it for
//! a day. The registry is optional: without a URL, or when the fetch fails, an
//! empty [`CountryReference`] is used and resolution falls back to the
//! built-in tables.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::cache::{Clock, TtlCache};
use crate::config::CountrySettings;
use crate::domain::CountryReference;
use crate::providers::http_client::{excerpt, read_body, RateLimitedClient};
use crate::providers::traits::{ProviderError, ProviderResult};

#[derive(Debug, Deserialize)]
struct RegistryCountry {
    name: RegistryName,
    cca2: String,
}

#[derive(Debug, Deserialize)]
struct RegistryName {
    common: String,
    #[serde(default)]
    official: Option<String>,
}

/// Cached access to the public country registry
pub struct CountryRegistry {
    client: RateLimitedClient,
    url: Option<String>,
    cache: TtlCache<CountryReference>,
}

impl CountryRegistry {
    pub fn new(settings: &CountrySettings, client: RateLimitedClient, clock: Arc<dyn Clock>) -> Self {
        CountryRegistry {
            client,
            url: settings
                .reference_url
                .clone()
                .filter(|u| !u.trim().is_empty()),
            cache: TtlCache::with_ttl_secs(settings.reference_ttl_secs, clock),
        }
    }

    /// Current reference table; never fails
    pub async fn reference(&self) -> CountryReference {
        if let Some(entry) = self.cache.get() {
            return entry.payload;
        }

        let Some(url) = self.url.as_deref() else {
            return CountryReference::default();
        };

        match self.fetch(url).await {
            Ok(reference) => {
                info!(countries = reference.len(), "Loaded country registry");
                self.cache.put(reference).payload
            }
            Err(e) => {
                warn!(error = %e, "Country registry unavailable, using built-in tables");
                CountryReference::default()
            }
        }
    }

    async fn fetch(&self, url: &str) -> ProviderResult<CountryReference> {
        let response = self.client.get(url).send().await?;
        let (status, body) = read_body(response).await?;

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        let countries: Vec<RegistryCountry> = serde_json::from_value(body)
            .map_err(|e| ProviderError::ParseError(format!("country registry: {e}")))?;

        Ok(CountryReference::from_pairs(countries.into_iter().flat_map(|c| {
            let code = c.cca2;
            std::iter::once((c.name.common, code.clone()))
                .chain(c.name.official.map(|official| (official, code)))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SystemClock;
    use crate::config::HttpSettings;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registry(url: Option<String>) -> CountryRegistry {
        let settings = CountrySettings {
            reference_url: url,
            reference_ttl_secs: 3600,
        };
        let http = RateLimitedClient::new(&HttpSettings::default()).unwrap();
        CountryRegistry::new(&settings, http, Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn test_without_url_is_empty() {
        assert!(registry(None).reference().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetches_once_and_caches() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3.1/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": {"common": "Mongolia", "official": "Mongolia"}, "cca2": "MN"},
                {"name": {"common": "Czechia", "official": "Czech Republic"}, "cca2": "CZ"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry(Some(format!("{}/v3.1/all", server.uri())));

        let first = registry.reference().await;
        assert_eq!(first.lookup("mongolia"), Some("MN"));
        assert_eq!(first.lookup("czech republic"), Some("CZ"));

        let second = registry.reference().await;
        assert_eq!(second.len(), first.len());
    }

    #[tokio::test]
    async fn test_failure_yields_empty_reference() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let registry = registry(Some(server.uri()));
        assert!(registry.reference().await.is_empty());
    }
}
