//! eSIM Gateway
//!
//! HTTP service in front of an eSIM plan provider and a QR payment provider.
//! Serves a normalized, cached country catalog, per-country plan lookups and
//! invoice creation/checking for a static storefront.

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_actix_web::TracingLogger;

mod api;
mod cache;
mod catalog;
mod config;
mod domain;
mod providers;

use crate::cache::{Clock, SystemClock};
use crate::catalog::{CountryCatalog, PlanSession};
use crate::config::Settings;
use crate::providers::{
    AirhubClient, CountryRegistry, PlanProvider, ProviderResult, QpayClient, RateLimitedClient,
};

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub started_at: Instant,
    pub catalog: CountryCatalog,
    pub payments: QpayClient,
}

impl AppState {
    /// Wire the live vendor clients from settings
    pub fn from_settings(settings: Settings) -> ProviderResult<Self> {
        let http = RateLimitedClient::new(&settings.http)?;
        info!(
            rate_limit_per_minute = http.rate_limit_per_minute(),
            timeout_secs = settings.http.timeout_secs,
            "Outbound HTTP client ready"
        );
        let provider = Arc::new(AirhubClient::new(&settings.airhub.base_url, http.clone())?);
        Self::new(settings, provider, http, Arc::new(SystemClock))
    }

    pub fn new(
        settings: Settings,
        provider: Arc<dyn PlanProvider>,
        http: RateLimitedClient,
        clock: Arc<dyn Clock>,
    ) -> ProviderResult<Self> {
        let session = Arc::new(PlanSession::new(provider, settings.airhub.clone(), clock.clone()));
        let registry = CountryRegistry::new(&settings.countries, http.clone(), clock.clone());
        let catalog = CountryCatalog::new(session, registry, &settings.catalog, clock);
        let payments = QpayClient::new(&settings.qpay.base_url, http)?;

        Ok(AppState {
            settings,
            started_at: Instant::now(),
            catalog,
            payments,
        })
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("esim_gateway=info,actix_web=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    // Load configuration
    let settings = Settings::load().context("failed to load configuration")?;
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let workers = settings.server.workers.unwrap_or_else(|| num_cpus::get() * 2);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        bind = %bind_addr,
        workers,
        "Starting eSIM gateway"
    );

    // Credentials are checked per request; a half-configured service still
    // starts and reports what is missing
    if let Err(missing) = settings.airhub.require() {
        tracing::warn!(%missing, "Plan provider not configured");
    }
    if let Err(missing) = settings.qpay.require_invoicing() {
        tracing::warn!(%missing, "Payment provider not configured");
    }

    let app_state = web::Data::new(
        AppState::from_settings(settings).context("failed to initialize vendor clients")?,
    );
    info!(
        countries = app_state.catalog.universe().len(),
        "Country universe ready"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "esim-gateway"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION"))),
            )
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
