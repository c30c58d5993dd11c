//! Endpoint integration tests: the assembled router served on an
//! ephemeral port against a mocked document store, driven over HTTP the
//! way real clients are.

use std::sync::Arc;

use axum::{routing::get, Router};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::router::doctor_routes;
use patient_cell::router::patient_routes;
use payment_cell::router::payment_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};

fn assemble_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "DocSpot API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .merge(patient_routes(state.clone()))
        .merge(doctor_routes(state.clone()))
        .merge(appointment_routes(state.clone()))
        .merge(payment_routes(state))
}

/// Serves the app on an ephemeral port and returns its base URL.
async fn serve(config: &TestConfig) -> String {
    let app = assemble_router(config.to_arc());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn root_endpoint_answers() {
    let store = MockServer::start().await;
    let config = TestConfig::default().with_store_url(&store.uri());
    let base = serve(&config).await;

    let body = reqwest::get(&base).await.unwrap().text().await.unwrap();
    assert_eq!(body, "DocSpot API is running!");
}

#[tokio::test]
async fn doctor_list_is_public_and_redacted() {
    let store = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_response(&doctor_id, "Dr. Richard James", true)
        ])))
        .mount(&store)
        .await;

    let config = TestConfig::default().with_store_url(&store.uri());
    let base = serve(&config).await;

    let body: Value = reqwest::get(format!("{}/doctor/list", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["doctors"][0]["name"], json!("Dr. Richard James"));
    assert!(body["doctors"][0].get("password").is_none());
    assert!(body["doctors"][0].get("email").is_none());
}

#[tokio::test]
async fn booking_requires_a_session() {
    let store = MockServer::start().await;
    let config = TestConfig::default().with_store_url(&store.uri());
    let base = serve(&config).await;

    let response = reqwest::Client::new()
        .post(format!("{}/user/book-appointment", base))
        .json(&json!({ "docId": Uuid::new_v4(), "slotDate": "5_3_2025", "slotTime": "2:00 PM" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn booking_succeeds_then_conflicts_on_the_same_pair() {
    let store = MockServer::start().await;
    let config = TestConfig::default().with_store_url(&store.uri());

    let patient = TestUser::patient("patient@example.com");
    let doctor_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));

    // First read: the slot is free
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_response(&doctor_id.to_string(), "Dr. Test", true)
        ])))
        .up_to_n_times(1)
        .mount(&store)
        .await;
    // Later reads observe the taken slot
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_with_slots(
                &doctor_id.to_string(),
                json!({ "5_3_2025": ["2:00 PM"] })
            )
        ])))
        .mount(&store)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_response(&patient.id, &patient.email, "Test Patient")
        ])))
        .mount(&store)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::appointment_response(
                &appointment_id.to_string(),
                &patient.id,
                &doctor_id.to_string(),
                "booked"
            )
        ])))
        .expect(1)
        .mount(&store)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .and(body_partial_json(json!({
            "slots_booked": { "5_3_2025": ["2:00 PM"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_with_slots(
                &doctor_id.to_string(),
                json!({ "5_3_2025": ["2:00 PM"] })
            )
        ])))
        .expect(1)
        .mount(&store)
        .await;

    let base = serve(&config).await;
    let client = reqwest::Client::new();
    let booking_body = json!({
        "docId": doctor_id,
        "slotDate": "5_3_2025",
        "slotTime": "14:00"
    });

    let response = client
        .post(format!("{}/user/book-appointment", base))
        .header("Authorization", bearer(&token))
        .json(&booking_body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Appointment Booked"));

    // Identical pair again: state conflict, map untouched
    let response = client
        .post(format!("{}/user/book-appointment", base))
        .header("Authorization", bearer(&token))
        .json(&booking_body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Slot Not Available"));
}

#[tokio::test]
async fn admin_session_reaches_admin_surface() {
    let store = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    let config = TestConfig::default().with_store_url(&store.uri());
    let base = serve(&config).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/admin/login", base))
        .json(&json!({
            "email": "admin@docspot.example",
            "password": "admin-test-password"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    let token = body["token"].as_str().unwrap().to_string();

    let response = client
        .get(format!("{}/admin/doctors", base))
        .header("Authorization", bearer(&token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    // A patient session is refused on the same surface
    let patient = TestUser::patient("patient@example.com");
    let patient_token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));
    let response = client
        .get(format!("{}/admin/doctors", base))
        .header("Authorization", bearer(&patient_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_are_rejected_by_the_middleware() {
    let store = MockServer::start().await;
    let config = TestConfig::default().with_store_url(&store.uri());
    let base = serve(&config).await;

    let patient = TestUser::patient("patient@example.com");
    let stale = JwtTestUtils::create_expired_token(&patient, &config.jwt_secret);

    let response = reqwest::Client::new()
        .get(format!("{}/user/appointments", base))
        .header("Authorization", bearer(&stale))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}
