//! Airhub API Client Implementation
//!
//! Implements [`PlanProvider`] against the Airhub partner API: a username and
//! password login that yields a bearer token, and a plan-information query
//! keyed by country codes.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::plan_list;
use crate::providers::http_client::{excerpt, read_body, RateLimitedClient};
use crate::providers::traits::{PlanProvider, ProviderError, ProviderResult};

use super::models::{extract_token, LoginRequest, PlanQueryShape};

const LOGIN_PATH: &str = "/api/Authentication/UserLogin";
const PLAN_PATH: &str = "/api/ESIM/GetPlanInformation";

/// Airhub API client
pub struct AirhubClient {
    /// Rate-limited HTTP client
    client: RateLimitedClient,

    /// Login endpoint
    login_url: Url,

    /// Plan information endpoint
    plan_url: Url,
}

impl AirhubClient {
    /// Create a client for the API at `base_url`
    pub fn new(base_url: &str, client: RateLimitedClient) -> ProviderResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ProviderError::NotConfigured(format!("invalid airhub.base_url '{base_url}': {e}")))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| ProviderError::NotConfigured(format!("invalid Airhub endpoint {path}: {e}")))
        };

        Ok(AirhubClient {
            login_url: join(LOGIN_PATH)?,
            plan_url: join(PLAN_PATH)?,
            client,
        })
    }

    /// Send one plan query body
    async fn query_once(&self, token: &str, body: &Value) -> ProviderResult<Value> {
        let response = self
            .client
            .post(self.plan_url.as_str())
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        match body {
            Value::String(text) => Err(ProviderError::ParseError(format!(
                "plan response is not JSON: {}",
                excerpt(&Value::String(text))
            ))),
            body => Ok(body),
        }
    }
}

#[async_trait]
impl PlanProvider for AirhubClient {
    fn code(&self) -> &'static str {
        "airhub"
    }

    async fn login(&self, username: &str, password: &str) -> ProviderResult<String> {
        let response = self
            .client
            .post(self.login_url.as_str())
            .json(&LoginRequest {
                user_name: username,
                password,
            })
            .send()
            .await?;

        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Airhub login rejected");
            return Err(ProviderError::AuthFailed(excerpt(&body)));
        }

        let token = extract_token(&body).ok_or_else(|| {
            warn!("Airhub login response did not include a token");
            ProviderError::AuthFailed(excerpt(&body))
        })?;

        info!("Airhub login successful");
        Ok(token)
    }

    async fn fetch_plans(
        &self,
        token: &str,
        partner_code: &str,
        country_codes: &[String],
    ) -> ProviderResult<Value> {
        if country_codes.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "plan query needs at least one country code".to_string(),
            ));
        }

        let mut last_empty = None;
        for shape in PlanQueryShape::variants_for(country_codes.len()) {
            let body = shape.body(partner_code, country_codes);
            let response = self.query_once(token, &body).await?;

            let count = plan_list(&response).map_or(0, Vec::len);
            if count > 0 {
                debug!(shape = shape.label(), plans = count, codes = ?country_codes, "Plan query answered");
                return Ok(response);
            }

            debug!(shape = shape.label(), codes = ?country_codes, "Plan query returned no plans, trying next shape");
            last_empty = Some(response);
        }

        info!(codes = ?country_codes, "No plans for codes under any request shape");
        last_empty.ok_or_else(|| ProviderError::Internal("no plan query shapes available".to_string()))
    }
}
