// libs/doctor-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    ChangeAvailabilityRequest, CreateDoctorRequest, DoctorError, DoctorProfile,
    UpdateDoctorProfileRequest,
};
use crate::services::doctor::DoctorService;

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::ValidationError(msg) => AppError::BadRequest(msg),
        DoctorError::DatabaseError(msg) => AppError::Internal(msg),
    }
}

/// Public doctor directory used by clients to pick a doctor and compute
/// offerable slots from the booked map.
#[axum::debug_handler]
pub async fn list_doctors(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);

    let doctors = service.list_doctors().await.map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors
    })))
}

/// Server-side rendition of the client slot computation: the next seven
/// days of offerable labels for one doctor.
#[axum::debug_handler]
pub async fn get_doctor_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doc_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state);

    let slots = service
        .available_slots(doc_id, Utc::now().naive_utc())
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "slots": slots
    })))
}

/// Availability toggle shared by the doctor panel (own record only) and
/// the admin panel (any record).
#[axum::debug_handler]
pub async fn change_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<ChangeAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let is_admin = user.role.as_deref() == Some("admin");
    let is_own_record =
        user.role.as_deref() == Some("doctor") && request.doc_id.to_string() == user.id;

    if !is_admin && !is_own_record {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = DoctorService::new(&state);
    service
        .change_availability(request.doc_id)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Availablity Changed"
    })))
}

#[axum::debug_handler]
pub async fn doctor_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("doctor") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let doctor_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid doctor ID".to_string()))?;

    let service = DoctorService::new(&state);
    let profile = service.get_profile(doctor_id).await.map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "profileData": profile
    })))
}

#[axum::debug_handler]
pub async fn update_doctor_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateDoctorProfileRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("doctor") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let doctor_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid doctor ID".to_string()))?;

    let service = DoctorService::new(&state);
    service
        .update_profile(doctor_id, request)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile Updated"
    })))
}

#[axum::debug_handler]
pub async fn add_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("admin") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = DoctorService::new(&state);
    let doctor = service.create_doctor(request).await.map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "doctor": DoctorProfile::from(doctor),
        "message": "Doctor Added"
    })))
}

#[axum::debug_handler]
pub async fn admin_list_doctors(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if user.role.as_deref() != Some("admin") {
        return Err(AppError::Auth("Unauthorized action".to_string()));
    }

    let service = DoctorService::new(&state);
    let doctors = service.list_profiles().await.map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors
    })))
}
