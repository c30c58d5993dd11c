// libs/auth-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::Json as JsonResponse,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AuthError, LoginRequest, PasswordResetRequest, RegisterRequest, ResetPasswordRequest,
    VerifyEmailRequest,
};
use crate::services::account::{admin_login, DoctorAccountService, PatientAccountService};

fn map_auth_error(e: AuthError) -> AppError {
    match e {
        AuthError::UnknownUser
        | AuthError::Unverified
        | AuthError::InvalidCredentials => AppError::Auth(e.to_string()),
        AuthError::MailError(msg) => AppError::ExternalService(msg),
        AuthError::TokenError(msg) => AppError::Internal(msg),
        AuthError::DatabaseError(msg) => AppError::Internal(msg),
        other => AppError::BadRequest(other.to_string()),
    }
}

// ==============================================================================
// PATIENT ACCOUNT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<JsonResponse<Value>, AppError> {
    debug!("Registering patient account");

    let service = PatientAccountService::new(&state);
    service.register(request).await.map_err(map_auth_error)?;

    Ok(JsonResponse(json!({
        "success": true,
        "message": "Registration successful! Please check your email to verify your account."
    })))
}

#[axum::debug_handler]
pub async fn verify_email(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<JsonResponse<Value>, AppError> {
    let service = PatientAccountService::new(&state);
    let token = service
        .verify_email(&request.token)
        .await
        .map_err(map_auth_error)?;

    Ok(JsonResponse(json!({
        "success": true,
        "message": "Email verified successfully! You are now logged in.",
        "token": token
    })))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<JsonResponse<Value>, AppError> {
    let service = PatientAccountService::new(&state);
    let token = service.login(request).await.map_err(map_auth_error)?;

    Ok(JsonResponse(json!({
        "success": true,
        "token": token
    })))
}

#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<JsonResponse<Value>, AppError> {
    let service = PatientAccountService::new(&state);
    service
        .request_password_reset(&request.email)
        .await
        .map_err(map_auth_error)?;

    Ok(JsonResponse(json!({
        "success": true,
        "message": "Password reset email sent! Please check your inbox."
    })))
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<JsonResponse<Value>, AppError> {
    let service = PatientAccountService::new(&state);
    service
        .reset_password(&request.token, &request.new_password)
        .await
        .map_err(map_auth_error)?;

    Ok(JsonResponse(json!({
        "success": true,
        "message": "Password reset successful! You can now login with your new password."
    })))
}

// ==============================================================================
// DOCTOR ACCOUNT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn doctor_login(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<JsonResponse<Value>, AppError> {
    let service = DoctorAccountService::new(&state);
    let token = service.login(request).await.map_err(map_auth_error)?;

    Ok(JsonResponse(json!({
        "success": true,
        "token": token
    })))
}

#[axum::debug_handler]
pub async fn doctor_forgot_password(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<JsonResponse<Value>, AppError> {
    let service = DoctorAccountService::new(&state);
    service
        .request_password_reset(&request.email)
        .await
        .map_err(map_auth_error)?;

    Ok(JsonResponse(json!({
        "success": true,
        "message": "Password reset email sent! Please check your inbox."
    })))
}

#[axum::debug_handler]
pub async fn doctor_reset_password(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<JsonResponse<Value>, AppError> {
    let service = DoctorAccountService::new(&state);
    service
        .reset_password(&request.token, &request.new_password)
        .await
        .map_err(map_auth_error)?;

    Ok(JsonResponse(json!({
        "success": true,
        "message": "Password reset successful! You can now login with your new password."
    })))
}

// ==============================================================================
// ADMIN SESSION HANDLER
// ==============================================================================

#[axum::debug_handler]
pub async fn admin_login_handler(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<JsonResponse<Value>, AppError> {
    let token =
        admin_login(&state, &request.email, &request.password).map_err(map_auth_error)?;

    Ok(JsonResponse(json!({
        "success": true,
        "token": token
    })))
}
