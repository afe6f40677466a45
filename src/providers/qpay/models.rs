//! QPay API request and response shapes

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use utoipa::ToSchema;

/// Receiver code QPay expects for merchant-terminal invoices
pub const TERMINAL_RECEIVER: &str = "terminal";

/// Body of `POST /v2/invoice`
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRequest {
    pub invoice_code: String,
    pub sender_invoice_no: String,
    pub invoice_receiver_code: String,
    pub invoice_description: String,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// Whole amounts go out as integers (`25000`, not `25000.0`)
pub fn serialize_amount<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if amount.fract() == 0.0 && amount.abs() <= MAX_EXACT {
        serializer.serialize_i64(*amount as i64)
    } else {
        serializer.serialize_f64(*amount)
    }
}

/// Created invoice, as returned to the browser
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct Invoice {
    pub invoice_id: String,
    #[serde(default)]
    pub qr_text: Option<String>,
    /// Base64-encoded PNG
    pub qr_image: String,
    /// Deep links into banking apps
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub urls: Vec<Value>,
}

/// Body of `POST /v2/payment/check`
#[derive(Debug, Clone, Serialize)]
pub struct PaymentCheckRequest<'a> {
    pub object_type: &'static str,
    pub object_id: &'a str,
    pub offset: PageOffset,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageOffset {
    pub page_number: u32,
    pub page_limit: u32,
}

impl<'a> PaymentCheckRequest<'a> {
    pub fn for_invoice(invoice_id: &'a str) -> Self {
        PaymentCheckRequest {
            object_type: "INVOICE",
            object_id: invoice_id,
            offset: PageOffset {
                page_number: 1,
                page_limit: 100,
            },
        }
    }
}

/// Payment status of an invoice plus the vendor's raw answer
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentCheck {
    pub paid: bool,
    #[schema(value_type = Object)]
    pub raw: Value,
}

impl PaymentCheck {
    /// An invoice is paid once any payment row reports `PAID`
    pub fn from_response(raw: Value) -> Self {
        let paid = raw
            .get("rows")
            .and_then(Value::as_array)
            .is_some_and(|rows| {
                rows.iter()
                    .any(|row| row.get("payment_status").and_then(Value::as_str) == Some("PAID"))
            });

        PaymentCheck { paid, raw }
    }
}
