// libs/appointment-cell/src/services/dashboard.rs
use std::collections::HashSet;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{AdminDashboard, AppointmentError, AppointmentStatus, DoctorDashboard};
use crate::services::booking::AppointmentBookingService;

pub struct DashboardService {
    booking: AppointmentBookingService,
}

impl DashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            booking: AppointmentBookingService::new(config),
        }
    }

    /// Panel summary for one doctor. Earnings count an appointment once
    /// it is either completed or paid for.
    pub async fn doctor_dashboard(
        &self,
        doctor_id: Uuid,
    ) -> Result<DoctorDashboard, AppointmentError> {
        debug!("Building dashboard for doctor {}", doctor_id);

        let appointments = self.booking.list_for_doctor(doctor_id).await?;

        let earnings = appointments
            .iter()
            .filter(|apt| apt.status == AppointmentStatus::Completed || apt.payment)
            .map(|apt| apt.amount)
            .sum();

        let patients: HashSet<Uuid> = appointments.iter().map(|apt| apt.patient_id).collect();

        Ok(DoctorDashboard {
            earnings,
            appointments: appointments.len(),
            patients: patients.len(),
            latest_appointments: appointments,
        })
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, AppointmentError> {
        debug!("Building admin dashboard");

        let appointments = self.booking.list_all().await?;

        let doctors: Vec<Value> = self
            .booking
            .store()
            .request(Method::GET, "/rest/v1/doctors?select=id", None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let patients: Vec<Value> = self
            .booking
            .store()
            .request(Method::GET, "/rest/v1/patients?select=id", None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(AdminDashboard {
            doctors: doctors.len(),
            appointments: appointments.len(),
            patients: patients.len(),
            latest_appointments: appointments,
        })
    }
}
