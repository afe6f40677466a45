//! HTTP request handlers

pub mod callback;
pub mod countries;
pub mod health;
pub mod invoice;
pub mod plans;

use actix_web::HttpResponse;

use crate::api::error::ErrorResponse;

/// Fallback for a known path called with the wrong method
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorResponse {
        error: "Method Not Allowed".to_string(),
        details: None,
    })
}
