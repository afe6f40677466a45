//! QPay Provider Module
//!
//! QR invoice payments: merchant token, invoice creation and payment checks.

mod client;
pub mod models;

pub use client::QpayClient;
pub use models::{serialize_amount, Invoice, InvoiceRequest, PaymentCheck, TERMINAL_RECEIVER};
