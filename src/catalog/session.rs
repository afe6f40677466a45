//! Authenticated plan-provider session
//!
//! Holds the account credentials and a cached bearer token. Tokens are reused
//! until their TTL runs out or the vendor answers 401, after which the session
//! logs in again and retries the query once.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{Clock, TtlCache};
use crate::config::{AirhubSettings, MissingSettings};
use crate::providers::{PlanProvider, ProviderError, ProviderResult};

pub struct PlanSession {
    provider: Arc<dyn PlanProvider>,
    settings: AirhubSettings,
    token: TtlCache<String>,
}

impl PlanSession {
    pub fn new(provider: Arc<dyn PlanProvider>, settings: AirhubSettings, clock: Arc<dyn Clock>) -> Self {
        let token = TtlCache::with_ttl_secs(settings.token_ttl_secs, clock);
        PlanSession {
            provider,
            settings,
            token,
        }
    }

    pub fn settings(&self) -> &AirhubSettings {
        &self.settings
    }

    /// Fail before any upstream call when credentials are missing
    pub fn require_config(&self) -> Result<(), MissingSettings> {
        self.settings.require()
    }

    /// Cached token, or a fresh one from the provider
    pub async fn token(&self) -> ProviderResult<String> {
        self.require_config()
            .map_err(|missing| ProviderError::NotConfigured(missing.to_string()))?;

        if let Some(entry) = self.token.get() {
            return Ok(entry.payload);
        }

        debug!(provider = self.provider.code(), "Logging in to plan provider");
        let token = self
            .provider
            .login(&self.settings.username, &self.settings.password)
            .await?;

        Ok(self.token.put(token).payload)
    }

    /// Replace a rejected token. A sibling query may already have stored a
    /// newer one, which is reused instead of logging in again.
    async fn reauthenticate(&self, rejected: &str) -> ProviderResult<String> {
        if !self.token.invalidate_if(&rejected.to_string()) {
            debug!(provider = self.provider.code(), "Token already refreshed");
        }
        self.token().await
    }

    /// Query plans for `codes`, re-authenticating once if the token was rejected
    pub async fn query(&self, codes: &[String]) -> ProviderResult<Value> {
        let token = self.token().await?;

        match self
            .provider
            .fetch_plans(&token, &self.settings.partner_code, codes)
            .await
        {
            Err(e) if e.is_unauthorized() => {
                warn!(provider = self.provider.code(), "Token rejected, logging in again");
                let token = self.reauthenticate(&token).await?;
                self.provider
                    .fetch_plans(&token, &self.settings.partner_code, codes)
                    .await
            }
            other => other,
        }
    }
}
