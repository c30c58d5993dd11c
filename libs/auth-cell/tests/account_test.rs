use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::models::{AuthError, LoginRequest, RegisterRequest};
use auth_cell::services::account::{admin_login, PatientAccountService};
use shared_utils::jwt::validate_token;
use shared_utils::password::hash_password;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

fn register_request() -> RegisterRequest {
    RegisterRequest {
        name: "Test Patient".to_string(),
        email: "patient@example.com".to_string(),
        password: "a-strong-password".to_string(),
    }
}

async fn service(store: &MockServer, mail: &MockServer) -> PatientAccountService {
    let config = TestConfig::default()
        .with_store_url(&store.uri())
        .with_mail_api_url(&mail.uri())
        .to_app_config();
    PatientAccountService::new(&config)
}

#[tokio::test]
async fn registration_validates_input_first() {
    let store = MockServer::start().await;
    let mail = MockServer::start().await;
    let service = service(&store, &mail).await;

    let mut missing = register_request();
    missing.name = String::new();
    assert!(matches!(
        service.register(missing).await.unwrap_err(),
        AuthError::MissingDetails
    ));

    let mut bad_email = register_request();
    bad_email.email = "nope".to_string();
    assert!(matches!(
        service.register(bad_email).await.unwrap_err(),
        AuthError::InvalidEmail
    ));

    let mut weak = register_request();
    weak.password = "short".to_string();
    assert!(matches!(
        service.register(weak).await.unwrap_err(),
        AuthError::WeakPassword
    ));
}

#[tokio::test]
async fn registration_stores_hash_and_sends_verification_mail() {
    let store = MockServer::start().await;
    let mail = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .and(body_partial_json(json!({ "is_verified": false })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::patient_response(
                &Uuid::new_v4().to_string(),
                "patient@example.com",
                "Test Patient"
            )
        ])))
        .expect(1)
        .mount(&store)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mail_1" })))
        .expect(1)
        .mount(&mail)
        .await;

    let service = service(&store, &mail).await;
    service.register(register_request()).await.unwrap();

    // Raw password never reaches the store
    let requests = store.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method == wiremock::http::Method::POST)
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&post.body).unwrap();
    assert!(body["password"].as_str().unwrap().starts_with("$argon2"));
    assert!(body["verification_token"].as_str().unwrap().len() >= 40);
}

#[tokio::test]
async fn duplicate_registration_is_refused() {
    let store = MockServer::start().await;
    let mail = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_response(
                &Uuid::new_v4().to_string(),
                "patient@example.com",
                "Test Patient"
            )
        ])))
        .mount(&store)
        .await;

    let service = service(&store, &mail).await;
    let err = service.register(register_request()).await.unwrap_err();

    assert!(matches!(err, AuthError::UserExists));
    assert_eq!(err.to_string(), "User already exists");
}

fn verified_patient_with_password(patient_id: &str, password: &str) -> serde_json::Value {
    let mut patient =
        MockStoreResponses::patient_response(patient_id, "patient@example.com", "Test Patient");
    patient["password"] = json!(hash_password(password).unwrap());
    patient
}

#[tokio::test]
async fn login_round_trips_a_patient_token() {
    let store = MockServer::start().await;
    let mail = MockServer::start().await;
    let patient_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.patient@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            verified_patient_with_password(&patient_id, "a-strong-password")
        ])))
        .mount(&store)
        .await;

    let config = TestConfig::default()
        .with_store_url(&store.uri())
        .with_mail_api_url(&mail.uri());
    let service = PatientAccountService::new(&config.to_app_config());

    let token = service
        .login(LoginRequest {
            email: "patient@example.com".to_string(),
            password: "a-strong-password".to_string(),
        })
        .await
        .unwrap();

    let user = validate_token(&token, &config.jwt_secret).unwrap();
    assert_eq!(user.id, patient_id);
    assert_eq!(user.role.as_deref(), Some("patient"));
}

#[tokio::test]
async fn login_rejects_unknown_wrong_and_unverified() {
    let store = MockServer::start().await;
    let mail = MockServer::start().await;
    let patient_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.ghost@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.patient@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            verified_patient_with_password(&patient_id, "a-strong-password")
        ])))
        .mount(&store)
        .await;

    let unverified = {
        let mut patient = verified_patient_with_password(&patient_id, "a-strong-password");
        patient["is_verified"] = json!(false);
        patient
    };
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.pending@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([unverified])))
        .mount(&store)
        .await;

    let service = service(&store, &mail).await;

    let err = service
        .login(LoginRequest {
            email: "ghost@example.com".to_string(),
            password: "whatever-pass".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User does not exist");

    let err = service
        .login(LoginRequest {
            email: "patient@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");

    let err = service
        .login(LoginRequest {
            email: "pending@example.com".to_string(),
            password: "a-strong-password".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please verify your email before logging in");
}

#[tokio::test]
async fn email_verification_flips_the_flag_and_logs_in() {
    let store = MockServer::start().await;
    let mail = MockServer::start().await;
    let patient_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("verification_token", "eq.the-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_response(&patient_id, "patient@example.com", "Test Patient")
        ])))
        .mount(&store)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(body_partial_json(json!({ "is_verified": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_response(&patient_id, "patient@example.com", "Test Patient")
        ])))
        .expect(1)
        .mount(&store)
        .await;

    let config = TestConfig::default()
        .with_store_url(&store.uri())
        .with_mail_api_url(&mail.uri());
    let service = PatientAccountService::new(&config.to_app_config());

    let token = service.verify_email("the-token").await.unwrap();
    let user = validate_token(&token, &config.jwt_secret).unwrap();
    assert_eq!(user.id, patient_id);
}

#[tokio::test]
async fn expired_verification_token_is_rejected() {
    let store = MockServer::start().await;
    let mail = MockServer::start().await;

    // Store-side expiry filter matches nothing
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    let service = service(&store, &mail).await;
    let err = service.verify_email("stale-token").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid or expired verification token");
}

#[tokio::test]
async fn reset_password_enforces_minimum_length() {
    let store = MockServer::start().await;
    let mail = MockServer::start().await;

    let service = service(&store, &mail).await;
    let err = service.reset_password("some-token", "short").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Please enter a strong password (min 8 characters)"
    );
}

#[test]
fn admin_login_checks_configured_credentials() {
    let config = TestConfig::default().to_app_config();

    let token = admin_login(&config, "admin@docspot.example", "admin-test-password").unwrap();
    let user = validate_token(&token, &config.jwt_secret).unwrap();
    assert_eq!(user.role.as_deref(), Some("admin"));

    assert!(matches!(
        admin_login(&config, "admin@docspot.example", "nope"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        admin_login(&config, "other@docspot.example", "admin-test-password"),
        Err(AuthError::InvalidCredentials)
    ));
}
