// libs/doctor-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    // The directory and slot computation are public; everything else
    // requires a panel session.
    let public_routes = Router::new()
        .route("/doctor/list", get(handlers::list_doctors))
        .route("/doctor/{doc_id}/slots", get(handlers::get_doctor_slots));

    let protected_routes = Router::new()
        .route("/doctor/change-availability", post(handlers::change_availability))
        .route("/doctor/profile", get(handlers::doctor_profile))
        .route("/doctor/update-profile", post(handlers::update_doctor_profile))
        .route("/admin/add-doctor", post(handlers::add_doctor))
        .route("/admin/doctors", get(handlers::admin_list_doctors))
        .route("/admin/change-availability", post(handlers::change_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
