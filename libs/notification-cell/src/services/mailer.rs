// libs/notification-cell/src/services/mailer.rs
use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{EmailMessage, NotificationError};

/// HTTP mail API client for transactional email.
/// POST {base}/emails with a bearer key and a from/to/subject/html body.
pub struct MailerClient {
    client: Client,
    base_url: String,
    api_key: String,
    from: String,
    frontend_url: String,
    admin_url: String,
}

impl MailerClient {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_mail_configured() {
            return Err(NotificationError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.mail_from.clone(),
            frontend_url: config.frontend_url.clone(),
            admin_url: config.admin_url.clone(),
        })
    }

    pub async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        let url = format!("{}/emails", self.base_url);
        debug!("Sending '{}' to {}", message.subject, message.to);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&message)
            .send()
            .await
            .map_err(|e| NotificationError::MailApiError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Mail API error: {} - {}", status, body);
            return Err(NotificationError::MailApiError {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        info!("Mail accepted for {}", message.to);
        Ok(())
    }

    /// Account verification mail. The link expires with the stored
    /// token (24 hours).
    pub async fn send_verification_email(
        &self,
        email: &str,
        token: &str,
        user_name: &str,
    ) -> Result<(), NotificationError> {
        let verification_url = format!("{}/verify-email?token={}", self.frontend_url, token);

        self.send(EmailMessage {
            from: self.from.clone(),
            to: email.to_string(),
            subject: "Verify Your DocSpot Account".to_string(),
            html: format!(
                "<p>Hi {},</p>\
                 <p>Thank you for registering with DocSpot. Please verify your \
                 email address:</p>\
                 <p><a href=\"{}\">Verify Email Address</a></p>\
                 <p>This link will expire in 24 hours. If you didn't create \
                 this account, please ignore this email.</p>",
                user_name, verification_url
            ),
        })
        .await
    }

    /// Password reset mail for patients; the token expires in 1 hour.
    pub async fn send_password_reset_email(
        &self,
        email: &str,
        token: &str,
        user_name: &str,
    ) -> Result<(), NotificationError> {
        let reset_url = format!("{}/reset-password?token={}", self.frontend_url, token);

        self.send(EmailMessage {
            from: self.from.clone(),
            to: email.to_string(),
            subject: "Reset Your DocSpot Password".to_string(),
            html: format!(
                "<p>Hi {},</p>\
                 <p>We received a request to reset your password:</p>\
                 <p><a href=\"{}\">Reset Password</a></p>\
                 <p>This link will expire in 1 hour. If you didn't request \
                 this, please ignore this email.</p>",
                user_name, reset_url
            ),
        })
        .await
    }

    /// Password reset mail for doctors; links into the admin panel.
    pub async fn send_doctor_password_reset_email(
        &self,
        email: &str,
        token: &str,
        doctor_name: &str,
    ) -> Result<(), NotificationError> {
        let reset_url = format!(
            "{}/reset-password?token={}&type=doctor",
            self.admin_url, token
        );

        self.send(EmailMessage {
            from: self.from.clone(),
            to: email.to_string(),
            subject: "Reset Your DocSpot Doctor Password".to_string(),
            html: format!(
                "<p>Hi Dr. {},</p>\
                 <p>We received a request to reset your doctor panel \
                 password:</p>\
                 <p><a href=\"{}\">Reset Password</a></p>\
                 <p>This link will expire in 1 hour. If you didn't request \
                 this, please ignore this email.</p>",
                doctor_name, reset_url
            ),
        })
        .await
    }
}
