// libs/appointment-cell/src/services/lifecycle.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, CancelRequester};
use crate::services::booking::AppointmentBookingService;

/// Terminal-state handling for appointments: cancellation (which gives
/// the slot back) and completion (which consumes it for good).
pub struct AppointmentLifecycleService {
    booking: AppointmentBookingService,
}

impl AppointmentLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            booking: AppointmentBookingService::new(config),
        }
    }

    /// `Booked` may move to either terminal state; a repeated cancel is
    /// tolerated so the operation stays idempotent. Everything else is a
    /// refused transition.
    pub fn validate_transition(
        current: AppointmentStatus,
        target: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        match (current, target) {
            (AppointmentStatus::Booked, AppointmentStatus::Cancelled)
            | (AppointmentStatus::Booked, AppointmentStatus::Completed)
            | (AppointmentStatus::Cancelled, AppointmentStatus::Cancelled) => Ok(()),
            _ => Err(AppointmentError::InvalidStatusTransition(current)),
        }
    }

    pub async fn cancel(
        &self,
        requester: CancelRequester,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let appointment = self.booking.get_appointment(appointment_id).await?;

        match requester {
            CancelRequester::Patient(patient_id) if appointment.patient_id != patient_id => {
                return Err(AppointmentError::Unauthorized);
            }
            CancelRequester::Doctor(doctor_id) if appointment.doctor_id != doctor_id => {
                return Err(AppointmentError::Unauthorized);
            }
            _ => {}
        }

        Self::validate_transition(appointment.status, AppointmentStatus::Cancelled)?;

        if appointment.status == AppointmentStatus::Cancelled {
            // Already cancelled; the slot was released the first time.
            return Ok(appointment);
        }

        let cancelled = self
            .set_status(&appointment, AppointmentStatus::Cancelled)
            .await?;

        self.release_slot(&appointment).await?;

        info!("Appointment {} cancelled by {:?}", appointment_id, requester);
        Ok(cancelled)
    }

    /// Marks an appointment done. The slot is considered permanently
    /// consumed, so the doctor's booked map is left untouched.
    pub async fn complete(
        &self,
        doctor_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Completing appointment: {}", appointment_id);

        let appointment = self.booking.get_appointment(appointment_id).await?;

        if appointment.doctor_id != doctor_id {
            return Err(AppointmentError::Unauthorized);
        }

        Self::validate_transition(appointment.status, AppointmentStatus::Completed)?;

        let completed = self
            .set_status(&appointment, AppointmentStatus::Completed)
            .await?;

        info!("Appointment {} completed", appointment_id);
        Ok(completed)
    }

    async fn set_status(
        &self,
        appointment: &Appointment,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment.id);
        let update = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .booking
            .store()
            .write(Method::PATCH, &path, update)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError(
                "Failed to update appointment".to_string(),
            ));
        }

        serde_json::from_value(result[0].clone()).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
        })
    }

    /// Removes the appointment's time label from the doctor's booked
    /// map. Filter-based: an absent label (or an already-deleted doctor)
    /// is a no-op rather than an error.
    async fn release_slot(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        let doctor = match self.booking.fetch_doctor(appointment.doctor_id).await {
            Ok(doctor) => doctor,
            Err(AppointmentError::DoctorNotFound) => return Ok(()),
            Err(e) => return Err(e),
        };

        let mut slots_booked = doctor.slots_booked.clone();
        slots_booked.release(appointment.slot_date, appointment.slot_time);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor.id);
        let _: Vec<Value> = self
            .booking
            .store()
            .write(Method::PATCH, &path, json!({ "slots_booked": slots_booked }))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn booked_reaches_both_terminal_states() {
        assert!(AppointmentLifecycleService::validate_transition(
            AppointmentStatus::Booked,
            AppointmentStatus::Cancelled
        )
        .is_ok());
        assert!(AppointmentLifecycleService::validate_transition(
            AppointmentStatus::Booked,
            AppointmentStatus::Completed
        )
        .is_ok());
    }

    #[test]
    fn repeated_cancel_is_tolerated() {
        assert!(AppointmentLifecycleService::validate_transition(
            AppointmentStatus::Cancelled,
            AppointmentStatus::Cancelled
        )
        .is_ok());
    }

    #[test]
    fn terminal_states_do_not_cross() {
        assert_matches!(
            AppointmentLifecycleService::validate_transition(
                AppointmentStatus::Cancelled,
                AppointmentStatus::Completed
            ),
            Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Cancelled))
        );
        assert_matches!(
            AppointmentLifecycleService::validate_transition(
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled
            ),
            Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Completed))
        );
        assert_matches!(
            AppointmentLifecycleService::validate_transition(
                AppointmentStatus::Completed,
                AppointmentStatus::Completed
            ),
            Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Completed))
        );
    }

    #[test]
    fn nothing_returns_to_booked() {
        for current in [AppointmentStatus::Cancelled, AppointmentStatus::Completed] {
            assert_matches!(
                AppointmentLifecycleService::validate_transition(
                    current,
                    AppointmentStatus::Booked
                ),
                Err(AppointmentError::InvalidStatusTransition(_))
            );
        }
    }
}
