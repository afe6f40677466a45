//! Payment endpoints: invoice creation and payment status

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorResponse};
use crate::domain::coerce_number;
use crate::providers::qpay::{serialize_amount, InvoiceRequest, PaymentCheck, TERMINAL_RECEIVER};
use crate::AppState;

const DEFAULT_DESCRIPTION: &str = "eSIM purchase";

/// Body of `POST /invoice`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    /// Positive amount, as a number or numeric string
    #[serde(default)]
    #[schema(value_type = f64)]
    pub amount: Value,
    /// Merchant order number; generated when absent
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateInvoiceRequest {
    fn valid_amount(&self) -> Option<f64> {
        coerce_number(&self.amount).filter(|a| *a > 0.0)
    }

    fn order_id(&self) -> String {
        non_blank(self.order_id.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("ORDER-{}", Utc::now().timestamp_millis()))
    }

    fn description(&self) -> String {
        non_blank(self.description.as_deref())
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Created invoice with the QR payload for the browser
#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceResponse {
    pub ok: bool,
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: f64,
    pub invoice_id: String,
    pub qr_text: Option<String>,
    /// Base64-encoded PNG
    pub qr_image: String,
    #[schema(value_type = Vec<Object>)]
    pub urls: Vec<Value>,
}

/// Body of `POST /invoice-check`
#[derive(Debug, Deserialize, ToSchema)]
pub struct InvoiceCheckRequest {
    #[serde(default)]
    pub invoice_id: Option<String>,
}

/// POST /invoice - Create a QR invoice
#[utoipa::path(
    post,
    path = "/invoice",
    tag = "payments",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice created", body = InvoiceResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 500, description = "Missing configuration", body = ErrorResponse)
    )
)]
pub async fn create_invoice(
    state: web::Data<AppState>,
    body: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, ApiError> {
    let amount = body
        .valid_amount()
        .ok_or_else(|| ApiError::Validation("Invalid amount".to_string()))?;

    let qpay = &state.settings.qpay;
    qpay.require_invoicing()?;

    let token = state
        .payments
        .authenticate(&qpay.username, &qpay.password)
        .await
        .map_err(|e| ApiError::from(e).context("QPay token request failed"))?;

    let order_id = body.order_id();
    let request = InvoiceRequest {
        invoice_code: qpay.invoice_code.clone(),
        sender_invoice_no: order_id.clone(),
        invoice_receiver_code: TERMINAL_RECEIVER.to_string(),
        invoice_description: body.description(),
        amount,
        callback_url: qpay.callback_url(),
    };

    let invoice = state
        .payments
        .create_invoice(&token, &request)
        .await
        .map_err(|e| ApiError::from(e).context("QPay invoice request failed"))?;

    Ok(HttpResponse::Ok().json(InvoiceResponse {
        ok: true,
        order_id,
        amount,
        invoice_id: invoice.invoice_id,
        qr_text: invoice.qr_text,
        qr_image: invoice.qr_image,
        urls: invoice.urls,
    }))
}

/// POST /invoice-check - Whether an invoice has been paid
#[utoipa::path(
    post,
    path = "/invoice-check",
    tag = "payments",
    request_body = InvoiceCheckRequest,
    responses(
        (status = 200, description = "Payment status", body = PaymentCheck),
        (status = 400, description = "Missing invoice_id", body = ErrorResponse),
        (status = 500, description = "Missing configuration", body = ErrorResponse)
    )
)]
pub async fn check_invoice(
    state: web::Data<AppState>,
    body: web::Json<InvoiceCheckRequest>,
) -> Result<HttpResponse, ApiError> {
    let invoice_id = non_blank(body.invoice_id.as_deref())
        .ok_or_else(|| ApiError::Validation("invoice_id required".to_string()))?;

    let qpay = &state.settings.qpay;
    qpay.require_credentials()?;

    let token = state
        .payments
        .authenticate(&qpay.username, &qpay.password)
        .await
        .map_err(|e| ApiError::from(e).context("QPay token request failed"))?;

    let check = state
        .payments
        .check_payment(&token, invoice_id)
        .await
        .map_err(|e| ApiError::from(e).context("QPay payment check failed"))?;

    Ok(HttpResponse::Ok().json(check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::configure_routes;
    use crate::api::handlers::test_support::{qpay_settings, settings, state};
    use crate::catalog::test_support::FakeProvider;
    use crate::config::Settings;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payment_settings(base_url: &str) -> Settings {
        Settings {
            qpay: qpay_settings(base_url),
            ..settings()
        }
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v2/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "qp-token"})))
            .mount(server)
            .await;
    }

    #[::core::prelude::v1::test]
    fn test_request_defaults() {
        let request: CreateInvoiceRequest = serde_json::from_value(json!({"amount": "15000"})).unwrap();
        assert_eq!(request.valid_amount(), Some(15000.0));
        assert!(request.order_id().starts_with("ORDER-"));
        assert_eq!(request.description(), "eSIM purchase");

        let request: CreateInvoiceRequest =
            serde_json::from_value(json!({"amount": 1, "orderId": " A-1 ", "description": ""})).unwrap();
        assert_eq!(request.order_id(), "A-1");
        assert_eq!(request.description(), "eSIM purchase");
    }

    #[::core::prelude::v1::test]
    fn test_invalid_amounts() {
        for amount in [json!(0), json!(-5), json!("abc"), json!(null), json!(true)] {
            let request: CreateInvoiceRequest = serde_json::from_value(json!({ "amount": amount })).unwrap();
            assert_eq!(request.valid_amount(), None, "{amount}");
        }
    }

    #[actix_web::test]
    async fn test_zero_amount_is_rejected_before_vendor_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(state(payment_settings(&server.uri()), Arc::new(FakeProvider::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/invoice")
            .set_json(json!({"amount": 0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_missing_credentials_is_500() {
        let app = test::init_service(
            App::new()
                .app_data(state(settings(), Arc::new(FakeProvider::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/invoice")
            .set_json(json!({"amount": 5000}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("qpay.invoice_code"));
    }

    #[actix_web::test]
    async fn test_create_invoice() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/invoice"))
            .and(body_partial_json(json!({
                "invoice_code": "SHOP_INVOICE",
                "sender_invoice_no": "ORDER-42",
                "invoice_description": "eSIM purchase",
                "amount": 25000,
                "callback_url": "https://shop.example.com/payment-callback"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "invoice_id": "inv-1",
                "qr_text": "0002010102",
                "qr_image": "iVBORw0KGgo=",
                "urls": [{"name": "Khan bank", "link": "khanbank://q"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(state(payment_settings(&server.uri()), Arc::new(FakeProvider::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/invoice")
            .set_json(json!({"amount": 25000, "orderId": "ORDER-42"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["orderId"], "ORDER-42");
        assert_eq!(body["amount"].as_i64(), Some(25000));
        assert_eq!(body["invoice_id"], "inv-1");
        assert_eq!(body["qr_image"], "iVBORw0KGgo=");
        assert_eq!(body["urls"].as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn test_token_failure_passes_vendor_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/auth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "NO_CREDENTIALS"})))
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(state(payment_settings(&server.uri()), Arc::new(FakeProvider::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/invoice")
            .set_json(json!({"amount": 100}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "QPay token request failed");
        assert_eq!(body["details"]["error"], "NO_CREDENTIALS");
    }

    #[actix_web::test]
    async fn test_check_invoice() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/payment/check"))
            .and(body_partial_json(json!({"object_id": "inv-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "rows": [{"payment_status": "PAID"}]
            })))
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(state(payment_settings(&server.uri()), Arc::new(FakeProvider::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/invoice-check")
            .set_json(json!({"invoice_id": "inv-1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["paid"], true);
        assert_eq!(body["raw"]["count"], 1);
    }

    #[actix_web::test]
    async fn test_check_requires_invoice_id() {
        let app = test::init_service(
            App::new()
                .app_data(state(settings(), Arc::new(FakeProvider::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/invoice-check")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_malformed_json_is_400() {
        let app = test::init_service(
            App::new()
                .app_data(state(settings(), Arc::new(FakeProvider::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/invoice")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}
