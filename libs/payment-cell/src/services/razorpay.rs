// libs/payment-cell/src/services/razorpay.rs
use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{CreateOrderBody, PaymentError, RazorpayOrder};

/// Razorpay Orders API client.
/// POST /orders creates an order; GET /orders/{id} fetches its state.
/// Authentication is HTTP basic with the key id/secret pair.
pub struct RazorpayClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(config: &AppConfig) -> Result<Self, PaymentError> {
        if !config.is_payment_configured() {
            return Err(PaymentError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.razorpay_base_url.clone(),
            key_id: config.razorpay_key_id.clone(),
            key_secret: config.razorpay_key_secret.clone(),
        })
    }

    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<RazorpayOrder, PaymentError> {
        let url = format!("{}/orders", self.base_url);
        debug!("Creating payment order for receipt {}", receipt);

        let body = CreateOrderBody {
            amount,
            currency: currency.to_string(),
            receipt: receipt.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayError {
                message: e.to_string(),
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| PaymentError::GatewayError {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            error!("Order creation failed: {} - {}", status, response_text);
            return Err(PaymentError::GatewayError {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        let order: RazorpayOrder =
            serde_json::from_str(&response_text).map_err(|e| PaymentError::GatewayError {
                message: format!("Failed to parse order response: {}", e),
            })?;

        info!("Created payment order {}", order.id);
        Ok(order)
    }

    pub async fn fetch_order(&self, order_id: &str) -> Result<RazorpayOrder, PaymentError> {
        let url = format!("{}/orders/{}", self.base_url, order_id);
        debug!("Fetching payment order {}", order_id);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(|e| PaymentError::GatewayError {
                message: e.to_string(),
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| PaymentError::GatewayError {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            error!("Order fetch failed: {} - {}", status, response_text);
            return Err(PaymentError::GatewayError {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| PaymentError::GatewayError {
            message: format!("Failed to parse order response: {}", e),
        })
    }
}
