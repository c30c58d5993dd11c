// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, BookAppointmentRequest, CancelAppointmentRequest, CancelRequester,
    CompleteAppointmentRequest, DoctorCancelAppointmentRequest,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::dashboard::DashboardService;
use crate::services::lifecycle::AppointmentLifecycleService;

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound(e.to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound(e.to_string()),
        AppointmentError::PatientNotFound => AppError::NotFound(e.to_string()),
        AppointmentError::DoctorNotAvailable => AppError::Conflict(e.to_string()),
        AppointmentError::SlotNotAvailable => AppError::Conflict(e.to_string()),
        AppointmentError::Unauthorized => AppError::Auth(e.to_string()),
        AppointmentError::InvalidStatusTransition(_) => AppError::BadRequest(e.to_string()),
        AppointmentError::ValidationError(msg) => AppError::BadRequest(msg),
        AppointmentError::DatabaseError(msg) => AppError::Internal(msg),
    }
}

fn require_uuid(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))
}

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("patient") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }
    let patient_id = require_uuid(&user)?;

    let service = AppointmentBookingService::new(&state);
    let appointment = service
        .book_appointment(patient_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment Booked"
    })))
}

#[axum::debug_handler]
pub async fn list_user_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("patient") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }
    let patient_id = require_uuid(&user)?;

    let service = AppointmentBookingService::new(&state);
    let appointments = service
        .list_for_patient(patient_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn cancel_user_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("patient") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }
    let patient_id = require_uuid(&user)?;

    let service = AppointmentLifecycleService::new(&state);
    service
        .cancel(CancelRequester::Patient(patient_id), request.appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Cancelled"
    })))
}

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("doctor") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }
    let doctor_id = require_uuid(&user)?;

    let service = AppointmentBookingService::new(&state);
    let appointments = service
        .list_for_doctor(doctor_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn cancel_doctor_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<DoctorCancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("doctor") || request.doc_id.to_string() != user.id {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = AppointmentLifecycleService::new(&state);
    service
        .cancel(
            CancelRequester::Doctor(request.doc_id),
            request.appointment_id,
        )
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Cancelled"
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("doctor") || request.doc_id.to_string() != user.id {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = AppointmentLifecycleService::new(&state);
    service
        .complete(request.doc_id, request.appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Completed"
    })))
}

#[axum::debug_handler]
pub async fn doctor_dashboard(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("doctor") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }
    let doctor_id = require_uuid(&user)?;

    let service = DashboardService::new(&state);
    let dashboard = service
        .doctor_dashboard(doctor_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "dashData": dashboard
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_all_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("admin") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = AppointmentBookingService::new(&state);
    let appointments = service.list_all().await.map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn cancel_any_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("admin") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = AppointmentLifecycleService::new(&state);
    service
        .cancel(CancelRequester::Admin, request.appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Cancelled"
    })))
}

#[axum::debug_handler]
pub async fn admin_dashboard(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("admin") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = DashboardService::new(&state);
    let dashboard = service
        .admin_dashboard()
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "dashData": dashboard
    })))
}
