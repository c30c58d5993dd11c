// libs/auth-cell/src/services/account.rs
use std::sync::OnceLock;

use chrono::{Duration, Utc};
use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::models::Doctor;
use notification_cell::MailerClient;
use patient_cell::models::Patient;
use shared_config::AppConfig;
use shared_database::StoreClient;
use shared_utils::jwt::issue_token;
use shared_utils::password::{generate_opaque_token, hash_password, verify_password};

use crate::models::{AuthError, LoginRequest, RegisterRequest};

const VERIFICATION_TOKEN_HOURS: i64 = 24;
const RESET_TOKEN_HOURS: i64 = 1;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

/// Patient account flows: registration with email verification, login,
/// and password reset.
pub struct PatientAccountService {
    store: StoreClient,
    config: AppConfig,
}

impl PatientAccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            config: config.clone(),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<(), AuthError> {
        if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingDetails);
        }
        if !email_regex().is_match(&request.email) {
            return Err(AuthError::InvalidEmail);
        }
        if request.password.len() < 8 {
            return Err(AuthError::WeakPassword);
        }

        if self.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to hash password: {}", e)))?;

        let verification_token = generate_opaque_token();
        let expires = Utc::now() + Duration::hours(VERIFICATION_TOKEN_HOURS);

        let patient_data = json!({
            "id": Uuid::new_v4(),
            "name": request.name,
            "email": request.email,
            "password": password_hash,
            "image": "",
            "phone": "",
            "address": { "line1": "", "line2": "" },
            "gender": "Not Selected",
            "dob": "Not Selected",
            "is_verified": false,
            "verification_token": verification_token,
            "verification_token_expires": expires.to_rfc3339(),
            "created_at": Utc::now().to_rfc3339()
        });

        let _: Vec<Value> = self
            .store
            .write(Method::POST, "/rest/v1/patients", patient_data)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let mailer = MailerClient::new(&self.config)
            .map_err(|e| AuthError::MailError(e.to_string()))?;
        mailer
            .send_verification_email(&request.email, &verification_token, &request.name)
            .await
            .map_err(|e| AuthError::MailError(e.to_string()))?;

        info!("Patient registered: {}", request.email);
        Ok(())
    }

    /// Marks the account verified and returns a session token so the
    /// client can log the user straight in.
    pub async fn verify_email(&self, token: &str) -> Result<String, AuthError> {
        let patient = self
            .find_by_token("verification_token", "verification_token_expires", token)
            .await?
            .ok_or(AuthError::InvalidVerificationToken)?;

        let path = format!("/rest/v1/patients?id=eq.{}", patient.id);
        let _: Vec<Value> = self
            .store
            .write(
                Method::PATCH,
                &path,
                json!({
                    "is_verified": true,
                    "verification_token": null,
                    "verification_token_expires": null
                }),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        info!("Patient verified: {}", patient.id);
        issue_token(&patient.id.to_string(), "patient", &self.config.jwt_secret)
            .map_err(AuthError::TokenError)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<String, AuthError> {
        let patient = self
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        if !patient.is_verified {
            return Err(AuthError::Unverified);
        }

        let matches = verify_password(&request.password, &patient.password)
            .map_err(|e| AuthError::DatabaseError(format!("Password check failed: {}", e)))?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        issue_token(&patient.id.to_string(), "patient", &self.config.jwt_secret)
            .map_err(AuthError::TokenError)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let patient = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let reset_token = generate_opaque_token();
        let expires = Utc::now() + Duration::hours(RESET_TOKEN_HOURS);

        let path = format!("/rest/v1/patients?id=eq.{}", patient.id);
        let _: Vec<Value> = self
            .store
            .write(
                Method::PATCH,
                &path,
                json!({
                    "reset_password_token": reset_token,
                    "reset_password_expires": expires.to_rfc3339()
                }),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let mailer = MailerClient::new(&self.config)
            .map_err(|e| AuthError::MailError(e.to_string()))?;
        mailer
            .send_password_reset_email(email, &reset_token, &patient.name)
            .await
            .map_err(|e| AuthError::MailError(e.to_string()))?;

        info!("Password reset requested for patient {}", patient.id);
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        if new_password.len() < 8 {
            return Err(AuthError::WeakResetPassword);
        }

        let patient = self
            .find_by_token("reset_password_token", "reset_password_expires", token)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let password_hash = hash_password(new_password)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to hash password: {}", e)))?;

        let path = format!("/rest/v1/patients?id=eq.{}", patient.id);
        let _: Vec<Value> = self
            .store
            .write(
                Method::PATCH,
                &path,
                json!({
                    "password": password_hash,
                    "reset_password_token": null,
                    "reset_password_expires": null
                }),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        info!("Password reset for patient {}", patient.id);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, AuthError> {
        let path = format!("/rest/v1/patients?email=eq.{}", urlencoding::encode(email));
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        parse_first(result)
    }

    /// Looks up a patient by a one-time token that has not yet expired.
    async fn find_by_token(
        &self,
        token_field: &str,
        expiry_field: &str,
        token: &str,
    ) -> Result<Option<Patient>, AuthError> {
        let now = Utc::now().to_rfc3339();
        let path = format!(
            "/rest/v1/patients?{}=eq.{}&{}=gt.{}",
            token_field,
            urlencoding::encode(token),
            expiry_field,
            urlencoding::encode(&now)
        );
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        parse_first(result)
    }
}

/// Doctor panel flows: login and password reset. Doctor accounts are
/// created by the admin, so there is no registration path here.
pub struct DoctorAccountService {
    store: StoreClient,
    config: AppConfig,
}

impl DoctorAccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            config: config.clone(),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<String, AuthError> {
        // Unknown account and wrong password answer identically
        let doctor = self
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = verify_password(&request.password, &doctor.password)
            .map_err(|e| AuthError::DatabaseError(format!("Password check failed: {}", e)))?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        issue_token(&doctor.id.to_string(), "doctor", &self.config.jwt_secret)
            .map_err(AuthError::TokenError)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let doctor = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::DoctorNotFound)?;

        let reset_token = generate_opaque_token();
        let expires = Utc::now() + Duration::hours(RESET_TOKEN_HOURS);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor.id);
        let _: Vec<Value> = self
            .store
            .write(
                Method::PATCH,
                &path,
                json!({
                    "reset_password_token": reset_token,
                    "reset_password_expires": expires.to_rfc3339()
                }),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let mailer = MailerClient::new(&self.config)
            .map_err(|e| AuthError::MailError(e.to_string()))?;
        mailer
            .send_doctor_password_reset_email(email, &reset_token, &doctor.name)
            .await
            .map_err(|e| AuthError::MailError(e.to_string()))?;

        info!("Password reset requested for doctor {}", doctor.id);
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        if new_password.len() < 8 {
            return Err(AuthError::WeakResetPassword);
        }

        let now = Utc::now().to_rfc3339();
        let path = format!(
            "/rest/v1/doctors?reset_password_token=eq.{}&reset_password_expires=gt.{}",
            urlencoding::encode(token),
            urlencoding::encode(&now)
        );
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let doctor: Doctor = match result.first() {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AuthError::DatabaseError(format!("Failed to parse doctor: {}", e)))?,
            None => return Err(AuthError::InvalidResetToken),
        };

        let password_hash = hash_password(new_password)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to hash password: {}", e)))?;

        let update_path = format!("/rest/v1/doctors?id=eq.{}", doctor.id);
        let _: Vec<Value> = self
            .store
            .write(
                Method::PATCH,
                &update_path,
                json!({
                    "password": password_hash,
                    "reset_password_token": null,
                    "reset_password_expires": null
                }),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        info!("Password reset for doctor {}", doctor.id);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, AuthError> {
        let path = format!("/rest/v1/doctors?email=eq.{}", urlencoding::encode(email));
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        match result.first() {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| AuthError::DatabaseError(format!("Failed to parse doctor: {}", e))),
            None => Ok(None),
        }
    }
}

/// Admin sessions come from configured credentials, not a stored
/// account.
pub fn admin_login(config: &AppConfig, email: &str, password: &str) -> Result<String, AuthError> {
    debug!("Admin login attempt");

    if config.admin_email.is_empty()
        || email != config.admin_email
        || password != config.admin_password
    {
        return Err(AuthError::InvalidCredentials);
    }

    issue_token("admin", "admin", &config.jwt_secret).map_err(AuthError::TokenError)
}

fn parse_first(result: Vec<Value>) -> Result<Option<Patient>, AuthError> {
    match result.first() {
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to parse patient: {}", e))),
        None => Ok(None),
    }
}
