// libs/auth-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    // Account flows are reachable without a session by nature
    Router::new()
        .route("/register", post(handlers::register))
        .route("/verify-email", post(handlers::verify_email))
        .route("/login", post(handlers::login))
        .route("/forgot-password", post(handlers::forgot_password))
        .route("/reset-password", post(handlers::reset_password))
        .route("/doctor/login", post(handlers::doctor_login))
        .route("/doctor/forgot-password", post(handlers::doctor_forgot_password))
        .route("/doctor/reset-password", post(handlers::doctor_reset_password))
        .route("/admin/login", post(handlers::admin_login_handler))
        .with_state(state)
}
