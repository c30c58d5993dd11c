// libs/payment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreatePaymentRequest, PaymentError, VerifyPaymentRequest};
use crate::services::payment::PaymentService;

fn map_payment_error(e: PaymentError) -> AppError {
    match e {
        PaymentError::NotConfigured => AppError::ExternalService(e.to_string()),
        PaymentError::AppointmentUnpayable => AppError::BadRequest(e.to_string()),
        PaymentError::GatewayError { message } => AppError::ExternalService(message),
        PaymentError::DatabaseError(msg) => AppError::Internal(msg),
    }
}

#[axum::debug_handler]
pub async fn create_payment_order(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("patient") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = PaymentService::new(&state).map_err(map_payment_error)?;
    let order = service
        .create_order(request.appointment_id)
        .await
        .map_err(map_payment_error)?;

    Ok(Json(json!({
        "success": true,
        "order": order
    })))
}

#[axum::debug_handler]
pub async fn verify_payment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("patient") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = PaymentService::new(&state).map_err(map_payment_error)?;
    let paid = service
        .verify_order(&request.razorpay_order_id)
        .await
        .map_err(map_payment_error)?;

    if paid {
        Ok(Json(json!({
            "success": true,
            "message": "Payment Successful"
        })))
    } else {
        Ok(Json(json!({
            "success": false,
            "message": "Payment Failed"
        })))
    }
}
