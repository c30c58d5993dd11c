use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub store_url: String,
    pub store_service_key: String,
    pub mail_api_url: String,
    pub razorpay_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            store_url: "http://localhost:54321".to_string(),
            store_service_key: "test-service-key".to_string(),
            mail_api_url: String::new(),
            razorpay_base_url: String::new(),
        }
    }
}

impl TestConfig {
    /// Point the store at a mock server.
    pub fn with_store_url(mut self, url: &str) -> Self {
        self.store_url = url.to_string();
        self
    }

    pub fn with_mail_api_url(mut self, url: &str) -> Self {
        self.mail_api_url = url.to_string();
        self
    }

    pub fn with_razorpay_base_url(mut self, url: &str) -> Self {
        self.razorpay_base_url = url.to_string();
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_url: self.store_url.clone(),
            store_service_key: self.store_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            admin_email: "admin@docspot.example".to_string(),
            admin_password: "admin-test-password".to_string(),
            razorpay_key_id: "rzp_test_key".to_string(),
            razorpay_key_secret: "rzp_test_secret".to_string(),
            razorpay_base_url: self.razorpay_base_url.clone(),
            currency: "INR".to_string(),
            mail_api_url: self.mail_api_url.clone(),
            mail_api_key: "mail-test-key".to_string(),
            mail_from: "DocSpot <no-reply@docspot.example>".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            admin_url: "http://localhost:5174".to_string(),
            port: 4000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn doctor_response(doctor_id: &str, name: &str, available: bool) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "name": name,
            "email": "doctor@docspot.example",
            "password": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$aGFzaGhhc2hoYXNoaGFzaA",
            "image": "https://cdn.docspot.example/doctors/doc1.png",
            "speciality": "General physician",
            "degree": "MBBS",
            "experience": "4 Years",
            "about": "Committed to first-line care and prevention.",
            "available": available,
            "fees": 500,
            "address": { "line1": "17th Cross, Richmond", "line2": "Circle, Ring Road, London" },
            "slots_booked": {},
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn doctor_with_slots(
        doctor_id: &str,
        slots_booked: serde_json::Value,
    ) -> serde_json::Value {
        let mut doctor = Self::doctor_response(doctor_id, "Dr. Test", true);
        doctor["slots_booked"] = slots_booked;
        doctor
    }

    pub fn patient_response(patient_id: &str, email: &str, name: &str) -> serde_json::Value {
        json!({
            "id": patient_id,
            "name": name,
            "email": email,
            "password": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$aGFzaGhhc2hoYXNoaGFzaA",
            "image": "https://cdn.docspot.example/avatars/default.png",
            "phone": "0000000000",
            "address": { "line1": "", "line2": "" },
            "gender": "Not Selected",
            "dob": "Not Selected",
            "is_verified": true,
            "verification_token": null,
            "verification_token_expires": null,
            "reset_password_token": null,
            "reset_password_expires": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        appointment_id: &str,
        patient_id: &str,
        doctor_id: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "patient_snapshot": {
                "name": "Test Patient",
                "email": "patient@example.com",
                "image": "https://cdn.docspot.example/avatars/default.png",
                "phone": "0000000000",
                "address": { "line1": "", "line2": "" },
                "gender": "Not Selected",
                "dob": "Not Selected"
            },
            "doctor_snapshot": {
                "name": "Dr. Test",
                "email": "doctor@docspot.example",
                "image": "https://cdn.docspot.example/doctors/doc1.png",
                "speciality": "General physician",
                "degree": "MBBS",
                "experience": "4 Years",
                "about": "Committed to first-line care and prevention.",
                "fees": 500,
                "address": { "line1": "17th Cross, Richmond", "line2": "Circle, Ring Road, London" }
            },
            "amount": 500,
            "slot_date": "5_3_2025",
            "slot_time": "2:00 PM",
            "status": status,
            "payment": false,
            "created_at": "2025-03-01T00:00:00Z",
            "updated_at": "2025-03-01T00:00:00Z"
        })
    }
}
