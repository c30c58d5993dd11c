// libs/payment-cell/src/services/payment.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus};
use shared_config::AppConfig;
use shared_database::StoreClient;

use crate::models::{PaymentError, RazorpayOrder};
use crate::services::razorpay::RazorpayClient;

pub struct PaymentService {
    store: StoreClient,
    gateway: RazorpayClient,
    currency: String,
}

impl PaymentService {
    pub fn new(config: &AppConfig) -> Result<Self, PaymentError> {
        Ok(Self {
            store: StoreClient::new(config),
            gateway: RazorpayClient::new(config)?,
            currency: config.currency.clone(),
        })
    }

    /// Creates a gateway order for an appointment's fee. Cancelled or
    /// missing appointments cannot be paid for.
    pub async fn create_order(&self, appointment_id: Uuid) -> Result<RazorpayOrder, PaymentError> {
        let appointment = match self.fetch_appointment(appointment_id).await? {
            Some(appointment) if appointment.status != AppointmentStatus::Cancelled => appointment,
            _ => {
                warn!("Refusing payment order for appointment {}", appointment_id);
                return Err(PaymentError::AppointmentUnpayable);
            }
        };

        // Gateway amounts are minor units
        self.gateway
            .create_order(
                appointment.amount * 100,
                &self.currency,
                &appointment_id.to_string(),
            )
            .await
    }

    /// Verifies an order with the gateway; a paid order flips the
    /// appointment's payment flag. Returns whether the payment settled.
    pub async fn verify_order(&self, order_id: &str) -> Result<bool, PaymentError> {
        let order = self.gateway.fetch_order(order_id).await?;

        if order.status != "paid" {
            return Ok(false);
        }

        let appointment_id = Uuid::parse_str(&order.receipt).map_err(|_| {
            PaymentError::GatewayError {
                message: format!("Order receipt is not an appointment id: {}", order.receipt),
            }
        })?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let _: Vec<Value> = self
            .store
            .write(Method::PATCH, &path, json!({ "payment": true }))
            .await
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        info!("Payment recorded for appointment {}", appointment_id);
        Ok(true)
    }

    async fn fetch_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Appointment>, PaymentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Ok(None);
        }

        serde_json::from_value(result[0].clone())
            .map(Some)
            .map_err(|e| PaymentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }
}
