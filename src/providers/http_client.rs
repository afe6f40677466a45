//! Rate-Limited HTTP Client for vendor APIs
//!
//! Wraps `reqwest` with a client-side request quota and an explicit per-call
//! timeout. Clones share the same quota.

use governor::{Quota, RateLimiter, state::NotKeyed, clock::DefaultClock, middleware::NoOpMiddleware};
use nonzero_ext::nonzero;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::HttpSettings;
use crate::providers::traits::{ProviderError, ProviderResult};

type DirectLimiter =
    RateLimiter<NotKeyed, governor::state::InMemoryState, DefaultClock, NoOpMiddleware>;

/// Rate-limited HTTP client for API requests
#[derive(Clone)]
pub struct RateLimitedClient {
    /// Inner HTTP client
    client: Client,

    /// Rate limiter (requests per minute), shared between clones
    limiter: Arc<DirectLimiter>,

    /// Configured rate limit
    rate_limit_per_minute: u32,
}

impl RateLimitedClient {
    /// Create a new rate-limited client from transport settings
    pub fn new(settings: &HttpSettings) -> ProviderResult<Self> {
        let rate = NonZeroU32::new(settings.rate_limit_per_minute).unwrap_or(nonzero!(1u32));
        let limiter = RateLimiter::direct(Quota::per_minute(rate));

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("esim-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(RateLimitedClient {
            client,
            limiter: Arc::new(limiter),
            rate_limit_per_minute: rate.get(),
        })
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Build a GET request
    pub fn get(&self, url: &str) -> RateLimitedRequestBuilder<'_> {
        RateLimitedRequestBuilder {
            client: self,
            builder: self.client.get(url),
        }
    }

    /// Build a POST request
    pub fn post(&self, url: &str) -> RateLimitedRequestBuilder<'_> {
        RateLimitedRequestBuilder {
            client: self,
            builder: self.client.post(url),
        }
    }

    /// Wait for rate limit and execute request
    async fn execute(&self, builder: RequestBuilder) -> ProviderResult<Response> {
        self.limiter.until_ready().await;

        debug!("Executing rate-limited request");

        let response = builder.send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            warn!(retry_after_secs = retry_after, "Rate limited by vendor");

            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        Ok(response)
    }
}

/// Request builder wrapper that enforces rate limiting
pub struct RateLimitedRequestBuilder<'a> {
    client: &'a RateLimitedClient,
    builder: RequestBuilder,
}

impl<'a> RateLimitedRequestBuilder<'a> {
    /// Add a header to the request
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Add JSON body to the request
    pub fn json<T: serde::Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.builder = self.builder.json(json);
        self
    }

    /// Add a bearer token header
    pub fn bearer_auth(mut self, token: &str) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// Send the request (waits for rate limit)
    pub async fn send(self) -> ProviderResult<Response> {
        self.client.execute(self.builder).await
    }
}

/// Status and body of a vendor response
///
/// The body is parsed as JSON when possible. Anything else is kept as a JSON
/// string so it can still be attached to error responses.
pub async fn read_body(response: Response) -> ProviderResult<(StatusCode, Value)> {
    let status = response.status();
    let text = response.text().await?;

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    Ok((status, body))
}

/// Shorten a body for logs and error messages
pub fn excerpt(body: &Value) -> String {
    let text = match body {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.chars().take(500).collect()
}
