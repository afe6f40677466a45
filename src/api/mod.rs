//! API module - HTTP routes and handlers

pub mod error;
pub mod handlers;
pub mod openapi;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::error::ApiError;
use crate::api::openapi::ApiDoc;

/// Malformed JSON bodies get the same error shape as every other failure
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::Validation(format!("invalid JSON body: {err}")).into())
}

/// Configure all API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::resource("/countries")
                .route(web::get().to(handlers::countries::list_countries))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        .service(
            web::resource("/plans")
                .route(web::get().to(handlers::plans::get_plans))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        .service(
            web::resource("/invoice")
                .route(web::post().to(handlers::invoice::create_invoice))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        .service(
            web::resource("/invoice-check")
                .route(web::post().to(handlers::invoice::check_invoice))
                .default_service(web::to(handlers::method_not_allowed)),
        )
        // Any method; the provider's callback verb is not fixed
        .service(web::resource("/payment-callback").to(handlers::callback::payment_callback))
        .route("/health", web::get().to(handlers::health::health_check))
        // Swagger UI and OpenAPI spec
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
}
