//! Payment provider callback

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::Value;
use tracing::info;

/// /payment-callback - Payment notification from QPay
///
/// Accepts any method and always answers `OK`; the payload is only logged.
#[utoipa::path(
    post,
    path = "/payment-callback",
    tag = "payments",
    request_body(content = Object, description = "Provider payload, JSON or text"),
    responses(
        (status = 200, description = "Acknowledged", body = String, content_type = "text/plain")
    )
)]
pub async fn payment_callback(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => info!(method = %req.method(), payload = %payload, "Payment callback"),
        Err(_) => info!(
            method = %req.method(),
            query = req.query_string(),
            raw = %String::from_utf8_lossy(&body),
            "Payment callback (non-JSON)"
        ),
    }

    HttpResponse::Ok().content_type("text/plain").body("OK")
}
