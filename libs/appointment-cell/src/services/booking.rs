// libs/appointment-cell/src/services/booking.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::Doctor;
use patient_cell::models::Patient;
use shared_config::AppConfig;
use shared_database::StoreClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, DoctorSnapshot,
    PatientSnapshot,
};

pub struct AppointmentBookingService {
    store: StoreClient,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Books a slot for a patient.
    ///
    /// The existence check against the booked map is the only guard on
    /// the slot, and it is not atomic with the append: between the read
    /// of the doctor document and the write of the updated map, a
    /// concurrent booking for the same pair can pass the same check.
    /// Any stronger guarantee would have to come from the store.
    pub async fn book_appointment(
        &self,
        patient_id: Uuid,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {} at {} {}",
            patient_id, request.doc_id, request.slot_date, request.slot_time
        );

        let doctor = self.fetch_doctor(request.doc_id).await?;

        if !doctor.available {
            warn!("Doctor {} is not accepting bookings", doctor.id);
            return Err(AppointmentError::DoctorNotAvailable);
        }

        let mut slots_booked = doctor.slots_booked.clone();
        if !slots_booked.insert(request.slot_date, request.slot_time) {
            warn!(
                "Slot {} {} already booked for doctor {}",
                request.slot_date, request.slot_time, doctor.id
            );
            return Err(AppointmentError::SlotNotAvailable);
        }

        let patient = self.fetch_patient(patient_id).await?;

        let now = Utc::now();
        let appointment_data = json!({
            "id": Uuid::new_v4(),
            "patient_id": patient_id,
            "doctor_id": doctor.id,
            "patient_snapshot": PatientSnapshot::from(&patient),
            "doctor_snapshot": DoctorSnapshot::from(&doctor),
            "amount": doctor.fees,
            "slot_date": request.slot_date,
            "slot_time": request.slot_time,
            "status": AppointmentStatus::Booked,
            "payment": false,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result: Vec<Value> = self
            .store
            .write(Method::POST, "/rest/v1/appointments", appointment_data)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError(
                "Failed to create appointment".to_string(),
            ));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| {
                AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
            })?;

        // Persist the updated booked map after the appointment record,
        // matching the write order callers may observe mid-failure.
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor.id);
        let _: Vec<Value> = self
            .store
            .write(Method::PATCH, &path, json!({ "slots_booked": slots_booked }))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        serde_json::from_value(result[0].clone()).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
        })
    }

    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=created_at.desc",
            patient_id
        );
        self.fetch_appointments(&path).await
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&order=created_at.desc",
            doctor_id
        );
        self.fetch_appointments(&path).await
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.fetch_appointments("/rest/v1/appointments?order=created_at.desc")
            .await
    }

    pub(crate) async fn fetch_appointments(
        &self,
        path: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e))
            })
    }

    pub(crate) async fn fetch_doctor(&self, doctor_id: Uuid) -> Result<Doctor, AppointmentError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::DoctorNotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    pub(crate) async fn fetch_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Patient, AppointmentError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::PatientNotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }

    pub(crate) fn store(&self) -> &StoreClient {
        &self.store
    }
}
