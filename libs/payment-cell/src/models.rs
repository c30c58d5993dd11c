// libs/payment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub appointment_id: Uuid,
}

/// Wire field name follows the gateway's checkout callback payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
}

/// Order as created/fetched on the gateway. Amounts are minor units
/// (the stored fee multiplied by 100).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderBody {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment gateway is not configured")]
    NotConfigured,

    #[error("Appointment Cancelled or not found")]
    AppointmentUnpayable,

    #[error("Payment gateway error: {message}")]
    GatewayError { message: String },

    #[error("Database error: {0}")]
    DatabaseError(String),
}
