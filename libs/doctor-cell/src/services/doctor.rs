// libs/doctor-cell/src/services/doctor.rs
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::StoreClient;
use shared_utils::password::hash_password;

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorError, DoctorListing, DoctorProfile,
    UpdateDoctorProfileRequest,
};
use crate::services::slots::{offerable_slots, DaySlots};

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

pub struct DoctorService {
    store: StoreClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Public doctor directory. Credentials and email never leave the
    /// service; the booked-slot map is included so clients can compute
    /// offerable slots locally.
    pub async fn list_doctors(&self) -> Result<Vec<DoctorListing>, DoctorError> {
        debug!("Fetching doctor directory");

        let result: Vec<Value> = self
            .store
            .request(Method::GET, "/rest/v1/doctors?order=name.asc", None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let doctors: Vec<Doctor> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctors: {}", e)))?;

        Ok(doctors.into_iter().map(DoctorListing::from).collect())
    }

    /// Panel directory: the full profile view, email included.
    pub async fn list_profiles(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, "/rest/v1/doctors?order=name.asc", None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let doctors: Vec<Doctor> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctors: {}", e)))?;

        Ok(doctors.into_iter().map(DoctorProfile::from).collect())
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    pub async fn get_profile(&self, doctor_id: Uuid) -> Result<DoctorProfile, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        Ok(DoctorProfile::from(doctor))
    }

    /// Offerable slots for the next seven days, derived from the
    /// doctor's current booked map and `now`.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        now: chrono::NaiveDateTime,
    ) -> Result<Vec<DaySlots>, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        Ok(offerable_slots(&doctor.slots_booked, now))
    }

    pub async fn update_profile(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorProfileRequest,
    ) -> Result<(), DoctorError> {
        debug!("Updating profile for doctor {}", doctor_id);

        // Confirm the doctor exists before patching
        self.get_doctor(doctor_id).await?;

        let mut update_data = serde_json::Map::new();
        if let Some(fees) = request.fees {
            update_data.insert("fees".to_string(), json!(fees));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), address);
        }
        if let Some(available) = request.available {
            update_data.insert("available".to_string(), json!(available));
        }

        if update_data.is_empty() {
            return Ok(());
        }

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let _: Vec<Value> = self
            .store
            .write(Method::PATCH, &path, Value::Object(update_data))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Flips the availability flag; returns the new value.
    pub async fn change_availability(&self, doctor_id: Uuid) -> Result<bool, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        let toggled = !doctor.available;

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let _: Vec<Value> = self
            .store
            .write(Method::PATCH, &path, json!({ "available": toggled }))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        info!("Doctor {} availability changed to {}", doctor_id, toggled);
        Ok(toggled)
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        self.validate_create_request(&request)?;

        // Refuse duplicate accounts
        let existing_path = format!(
            "/rest/v1/doctors?email=eq.{}",
            urlencoding::encode(&request.email)
        );
        let existing: Vec<Value> = self
            .store
            .request(Method::GET, &existing_path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            return Err(DoctorError::ValidationError(
                "Doctor already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to hash password: {}", e)))?;

        let doctor_data = json!({
            "id": Uuid::new_v4(),
            "name": request.name,
            "email": request.email,
            "password": password_hash,
            "image": request.image.unwrap_or_default(),
            "speciality": request.speciality,
            "degree": request.degree,
            "experience": request.experience,
            "about": request.about,
            "available": true,
            "fees": request.fees,
            "address": request.address,
            "slots_booked": {},
            "created_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .store
            .write(Method::POST, "/rest/v1/doctors", doctor_data)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::DatabaseError(
                "Failed to create doctor".to_string(),
            ));
        }

        let doctor: Doctor = serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))?;

        info!("Doctor {} added", doctor.id);
        Ok(doctor)
    }

    fn validate_create_request(&self, request: &CreateDoctorRequest) -> Result<(), DoctorError> {
        if request.name.is_empty()
            || request.email.is_empty()
            || request.password.is_empty()
            || request.speciality.is_empty()
            || request.degree.is_empty()
            || request.experience.is_empty()
            || request.about.is_empty()
        {
            return Err(DoctorError::ValidationError("Missing Details".to_string()));
        }

        if !email_regex().is_match(&request.email) {
            return Err(DoctorError::ValidationError(
                "Please enter a valid email".to_string(),
            ));
        }

        if request.password.len() < 8 {
            return Err(DoctorError::ValidationError(
                "Please enter a strong password".to_string(),
            ));
        }

        Ok(())
    }
}
