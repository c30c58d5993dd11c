// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // Every appointment operation requires an authenticated session
    let protected_routes = Router::new()
        .route("/user/book-appointment", post(handlers::book_appointment))
        .route("/user/appointments", get(handlers::list_user_appointments))
        .route("/user/cancel-appointment", post(handlers::cancel_user_appointment))
        .route("/doctor/appointments", get(handlers::list_doctor_appointments))
        .route("/doctor/cancel-appointment", post(handlers::cancel_doctor_appointment))
        .route("/doctor/complete-appointment", post(handlers::complete_appointment))
        .route("/doctor/dashboard", get(handlers::doctor_dashboard))
        .route("/admin/appointments", get(handlers::list_all_appointments))
        .route("/admin/cancel-appointment", post(handlers::cancel_any_appointment))
        .route("/admin/dashboard", get(handlers::admin_dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
