//! QPay API Client Implementation
//!
//! Merchant token via HTTP Basic credentials, invoice creation and payment
//! status checks. Vendor failures keep the vendor's status and body so the
//! handlers can pass them through.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::providers::http_client::{excerpt, read_body, RateLimitedClient};
use crate::providers::traits::{ProviderError, ProviderResult};

use super::models::{Invoice, InvoiceRequest, PaymentCheck, PaymentCheckRequest};

const TOKEN_PATH: &str = "/v2/auth/token";
const INVOICE_PATH: &str = "/v2/invoice";
const PAYMENT_CHECK_PATH: &str = "/v2/payment/check";

/// Status reported when the vendor answers 2xx without the fields we need
const BAD_GATEWAY: u16 = 502;

/// QPay merchant API client
#[derive(Clone)]
pub struct QpayClient {
    client: RateLimitedClient,
    base_url: Url,
}

impl QpayClient {
    pub fn new(base_url: &str, client: RateLimitedClient) -> ProviderResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ProviderError::NotConfigured(format!("invalid qpay.base_url '{base_url}': {e}")))?;

        Ok(QpayClient { client, base_url })
    }

    fn endpoint(&self, path: &str) -> ProviderResult<String> {
        self.base_url
            .join(path)
            .map(String::from)
            .map_err(|e| ProviderError::Internal(format!("invalid QPay endpoint {path}: {e}")))
    }

    /// Obtain a merchant access token
    pub async fn authenticate(&self, username: &str, password: &str) -> ProviderResult<String> {
        let basic = STANDARD.encode(format!("{username}:{password}"));

        let response = self
            .client
            .post(&self.endpoint(TOKEN_PATH)?)
            .header("Authorization", &format!("Basic {basic}"))
            .send()
            .await?;

        let (status, body) = read_body(response).await?;
        debug!(status = status.as_u16(), "QPay token response");

        if !status.is_success() {
            warn!(status = status.as_u16(), "QPay token request rejected");
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        body.get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ApiError {
                status: BAD_GATEWAY,
                message: "token response did not include access_token".to_string(),
            })
    }

    /// Create an invoice and return its QR payload
    pub async fn create_invoice(&self, token: &str, request: &InvoiceRequest) -> ProviderResult<Invoice> {
        let response = self
            .client
            .post(&self.endpoint(INVOICE_PATH)?)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let (status, body) = read_body(response).await?;
        debug!(status = status.as_u16(), body = %excerpt(&body), "QPay invoice response");

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        let invoice: Invoice = serde_json::from_value(body.clone()).map_err(|e| {
            warn!(error = %e, "QPay invoice response missing fields");
            ProviderError::ApiError {
                status: BAD_GATEWAY,
                message: excerpt(&body),
            }
        })?;

        info!(
            invoice_id = %invoice.invoice_id,
            order = %request.sender_invoice_no,
            "QPay invoice created"
        );
        Ok(invoice)
    }

    /// Look up payments recorded against an invoice
    pub async fn check_payment(&self, token: &str, invoice_id: &str) -> ProviderResult<PaymentCheck> {
        let response = self
            .client
            .post(&self.endpoint(PAYMENT_CHECK_PATH)?)
            .bearer_auth(token)
            .json(&PaymentCheckRequest::for_invoice(invoice_id))
            .send()
            .await?;

        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        let check = PaymentCheck::from_response(body);
        debug!(invoice_id, paid = check.paid, "QPay payment check");
        Ok(check)
    }
}
