//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::error::ErrorResponse;
use crate::api::handlers::{
    health::HealthResponse,
    invoice::{CreateInvoiceRequest, InvoiceCheckRequest, InvoiceResponse},
};
use crate::catalog::CountriesPayload;
use crate::domain::{Continent, CountrySummary};
use crate::providers::qpay::PaymentCheck;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "eSIM Gateway API",
        version = "1.0.0",
        description = "eSIM country catalog, plan lookup and QR invoice payments",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "catalog", description = "Country catalog and plan lookup"),
        (name = "payments", description = "Invoice creation, payment checks and callbacks")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::countries::list_countries,
        crate::api::handlers::plans::get_plans,
        crate::api::handlers::invoice::create_invoice,
        crate::api::handlers::invoice::check_invoice,
        crate::api::handlers::callback::payment_callback,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            // Catalog schemas
            CountriesPayload,
            CountrySummary,
            Continent,
            // Payment schemas
            CreateInvoiceRequest,
            InvoiceResponse,
            InvoiceCheckRequest,
            PaymentCheck,
        )
    )
)]
pub struct ApiDoc;
